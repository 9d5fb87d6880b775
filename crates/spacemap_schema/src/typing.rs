//! Documented type token to storage type.

use std::collections::HashMap;

use spacemap_store::StorageType;

/// Resolve a documented type token.
///
/// Class references (`\App\Entity\Tag`) are stored as the referenced id.
/// Unknown tokens fall back to `str`.
pub fn resolve_storage_type(token: &str) -> StorageType {
    if token.starts_with('\\') {
        return StorageType::Unsigned;
    }
    match token {
        "array" => StorageType::Any,
        "int" | "integer" => StorageType::Unsigned,
        _ => StorageType::Str,
    }
}

/// Memoized [`resolve_storage_type`].
#[derive(Debug, Default, Clone)]
pub struct TypeCache {
    entries: HashMap<String, StorageType>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, token: &str) -> StorageType {
        if let Some(hit) = self.entries.get(token) {
            return *hit;
        }
        let resolved = resolve_storage_type(token);
        self.entries.insert(token.to_string(), resolved);
        resolved
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
