//! Schema types shared by every store implementation.
//!
//! A [`Space`] is the unit of schema: an ordered list of typed properties plus
//! its indexes. The validation rules for adding properties and indexes live on
//! `Space` itself so that every [`SchemaStore`](crate::SchemaStore)
//! implementation enforces the same invariants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StoreError};

// ============================================================================
// Storage Types
// ============================================================================

/// Storage type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    /// Non-negative integer (also used for references to other entities)
    #[serde(rename = "unsigned")]
    Unsigned,
    /// String
    #[serde(rename = "str")]
    Str,
    /// Any value (arrays, maps)
    #[serde(rename = "*")]
    Any,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Unsigned => "unsigned",
            StorageType::Str => "str",
            StorageType::Any => "*",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Row Values
// ============================================================================

/// A single field value of a stored row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Unsigned(u64),
    Str(String),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            Value::Unsigned(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Unsigned(u64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// A stored tuple. Rows are keyed by their first field.
pub type Row = Vec<Value>;

// ============================================================================
// Properties and Indexes
// ============================================================================

/// A typed, ordinally positioned field of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Zero-based position, assigned on creation and never changed
    pub ordinal: u32,
    pub storage_type: StorageType,
}

/// An index as persisted on a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    /// Participating properties; order defines sort precedence
    pub fields: Vec<String>,
    pub unique: bool,
}

/// Request to create an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Explicit name; defaults to the fields joined with `_`
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<String>,
    #[serde(default = "default_unique")]
    pub unique: bool,
    /// Skip silently when an equivalent index already exists
    #[serde(default)]
    pub if_not_exists: bool,
}

fn default_unique() -> bool {
    true
}

impl IndexDescriptor {
    /// Unique index over the given fields.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
            unique: true,
            if_not_exists: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn non_unique(self) -> Self {
        self.with_unique(false)
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// The name the index is stored under.
    pub fn resolved_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.fields.join("_"),
        }
    }
}

// ============================================================================
// Space
// ============================================================================

/// A named schema container with ordered properties and indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    id: u32,
    name: String,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    indexes: Vec<Index>,
}

impl Space {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in ordinal order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Indexes in creation order; the first one is the primary index.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn index_on(&self, fields: &[String]) -> Option<&Index> {
        self.indexes.iter().find(|i| i.fields == fields)
    }

    /// Append a property at the next free ordinal.
    pub fn add_property(&mut self, name: &str, storage_type: StorageType) -> Result<&Property> {
        if self.has_property(name) {
            return Err(StoreError::PropertyExists {
                space: self.name.clone(),
                property: name.to_string(),
            });
        }

        let ordinal = self.properties.len() as u32;
        self.properties.push(Property {
            name: name.to_string(),
            ordinal,
            storage_type,
        });
        Ok(&self.properties[self.properties.len() - 1])
    }

    /// Create an index. Returns `false` when an equivalent index already exists.
    ///
    /// An index with the same field list is equivalent. With `if_not_exists`,
    /// an index with the same name is also treated as already present.
    pub fn add_index(&mut self, descriptor: &IndexDescriptor) -> Result<bool> {
        let index_name = descriptor.resolved_name();

        if descriptor.fields.is_empty() {
            return Err(StoreError::EmptyIndex(self.name.clone()));
        }
        if let Some(missing) = descriptor.fields.iter().find(|f| !self.has_property(f)) {
            return Err(StoreError::unknown_property(&self.name, missing));
        }

        if let Some(existing) = self.index_on(&descriptor.fields) {
            if existing.unique == descriptor.unique || descriptor.if_not_exists {
                return Ok(false);
            }
            return Err(StoreError::IndexConflict {
                space: self.name.clone(),
                index: index_name,
            });
        }

        if self.index(&index_name).is_some() {
            if descriptor.if_not_exists {
                return Ok(false);
            }
            return Err(StoreError::IndexConflict {
                space: self.name.clone(),
                index: index_name,
            });
        }

        if self.indexes.is_empty() && !descriptor.unique {
            return Err(StoreError::PrimaryNotUnique {
                space: self.name.clone(),
                index: index_name,
            });
        }

        self.indexes.push(Index {
            name: index_name,
            fields: descriptor.fields.clone(),
            unique: descriptor.unique,
        });
        Ok(true)
    }
}
