//! Errors raised while registering declarations or reconciling them.
//!
//! All of these are declaration errors: retrying without fixing the
//! declaration fails the same way.

use spacemap_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Class is neither an entity nor a repository, or is an abstract base
    #[error("Invalid registration of {class}: {reason}")]
    InvalidRegistration { class: String, reason: String },

    #[error("No type annotation for {class}::{property}")]
    MissingTypeAnnotation { class: String, property: String },

    #[error("{count} type annotations for {class}::{property}, expected exactly one")]
    AmbiguousTypeAnnotation {
        class: String,
        property: String,
        count: usize,
    },

    #[error("Repository {repository} has no entity definition for space {space}")]
    MissingEntityDefinition { repository: String, space: String },

    #[error("No primary index on {space}: no indexes declared and no id property")]
    NoPrimaryIndex { space: String },

    /// Identifier normalizes to an empty name
    #[error("Identifier {0:?} does not produce a storage name")]
    InvalidIdentifier(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn invalid_registration(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            class: class.into(),
            reason: reason.into(),
        }
    }
}
