//! Canonical storage names for class and property identifiers.
//!
//! `BlogPost` becomes `blog_post` and `HTTPClient` becomes `http_client`. A
//! run of capitals followed by a capitalized word is one segment (acronyms
//! stay whole). Otherwise a segment is one letter followed by lowercase
//! letters or digits. Characters outside any segment are dropped.

use std::collections::HashMap;
use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::error::{Result, SchemaError};

/// An acronym run ending at the end or before a capitalized word, else a
/// letter followed by lowercase letters or digits.
static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][A-Z0-9]*(?=$|[A-Z][a-z0-9])|[A-Za-z][a-z0-9]+")
        .expect("segment pattern compiles")
});

/// Convert an identifier to its lowercase, underscore-joined form.
///
/// Yields an empty string when no segment matches; [`NameCache::normalize`]
/// turns that into an error.
pub fn to_underscore(input: &str) -> Result<String> {
    let segments = SEGMENT
        .find_iter(input)
        .map(|m| m.map(|m| canonical_segment(m.as_str())))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| SchemaError::InvalidIdentifier(input.to_string()))?;
    Ok(segments.join("_"))
}

fn canonical_segment(segment: &str) -> String {
    if segment == segment.to_ascii_uppercase() {
        return segment.to_ascii_lowercase();
    }
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Memoized [`to_underscore`], scoped to its owner.
#[derive(Debug, Default, Clone)]
pub struct NameCache {
    entries: HashMap<String, String>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `input`, failing with `InvalidIdentifier` when nothing remains.
    pub fn normalize(&mut self, input: &str) -> Result<String> {
        if let Some(hit) = self.entries.get(input) {
            return Ok(hit.clone());
        }

        let name = to_underscore(input)?;
        if name.is_empty() {
            return Err(SchemaError::InvalidIdentifier(input.to_string()));
        }
        self.entries.insert(input.to_string(), name.clone());
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
