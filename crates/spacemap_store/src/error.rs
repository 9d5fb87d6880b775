//! Error types for the schema store.

use thiserror::Error;

/// Schema store operation result type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Schema store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A space with this name already exists
    #[error("Space already exists: {0}")]
    SpaceExists(String),

    /// No space with this name
    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    /// The space already has a property with this name
    #[error("Property {property} already exists on space {space}")]
    PropertyExists { space: String, property: String },

    /// An index or row refers to a property the space does not have
    #[error("Unknown property {property} on space {space}")]
    UnknownProperty { space: String, property: String },

    /// Index descriptor with no fields
    #[error("Index on space {0} has no fields")]
    EmptyIndex(String),

    /// Index clashes with an existing one and `if_not_exists` was not set
    #[error("Index {index} conflicts with an existing index on space {space}")]
    IndexConflict { space: String, index: String },

    /// The first index of a space must be unique
    #[error("Primary index {index} on space {space} must be unique")]
    PrimaryNotUnique { space: String, index: String },

    /// Row has more fields than the space has properties
    #[error("Row for space {space} has {got} fields, space has {expected} properties")]
    RowArity {
        space: String,
        expected: usize,
        got: usize,
    },

    /// A row with the same key already exists
    #[error("Duplicate key {key} in space {space}")]
    DuplicateKey { space: String, key: String },

    /// Stored row does not have the expected shape
    #[error("Invalid row in space {space}: {reason}")]
    InvalidRow { space: String, reason: String },

    /// IO error (snapshot files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a space not found error.
    pub fn space_not_found(name: impl Into<String>) -> Self {
        Self::SpaceNotFound(name.into())
    }

    /// Create an unknown property error.
    pub fn unknown_property(space: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            space: space.into(),
            property: property.into(),
        }
    }
}
