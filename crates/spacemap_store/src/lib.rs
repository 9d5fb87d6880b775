//! Schema store layer for spacemap
//!
//! Spaces, their typed properties and indexes, plus raw row storage. The
//! reconciliation engine in `spacemap_schema` only talks to the
//! [`SchemaStore`] trait; [`MemoryStore`] is the bundled implementation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use spacemap_store::{IndexDescriptor, MemoryStore, SchemaStore, StorageType};
//!
//! let mut store = MemoryStore::load("schema.json")?;
//! store.create_space("person")?;
//! store.add_property("person", "id", StorageType::Unsigned)?;
//! store.add_index("person", &IndexDescriptor::new(["id"]))?;
//! store.save("schema.json")?;
//! ```

mod error;
mod memory;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, FIRST_SPACE_ID};
pub use store::SchemaStore;
pub use types::*;
