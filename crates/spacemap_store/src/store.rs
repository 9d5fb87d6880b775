//! The schema store capability consumed by the reconciliation engine.

use crate::error::Result;
use crate::types::{IndexDescriptor, Row, Space, StorageType};

/// Current schema state plus the create/alter primitives over it.
///
/// Reads return snapshots of [`Space`]; every mutation goes through the store
/// so implementations can persist or mirror it. Implementations must reject
/// `add_property` for an existing name and treat an equivalent index as
/// already present (see [`Space::add_index`]).
pub trait SchemaStore {
    fn has_space(&self, name: &str) -> bool;

    /// Create an empty space. Fails if the name is taken.
    fn create_space(&mut self, name: &str) -> Result<&Space>;

    fn space(&self, name: &str) -> Result<&Space>;

    fn space_id(&self, name: &str) -> Result<u32> {
        self.space(name).map(Space::id)
    }

    /// All spaces, ordered by id.
    fn spaces(&self) -> Vec<&Space>;

    fn add_property(&mut self, space: &str, name: &str, storage_type: StorageType) -> Result<()>;

    /// Create an index; `Ok(false)` when an equivalent index already exists.
    fn add_index(&mut self, space: &str, descriptor: &IndexDescriptor) -> Result<bool>;

    /// Insert a row; fails on a duplicate key.
    fn insert(&mut self, space: &str, row: Row) -> Result<()>;

    /// Insert or overwrite the row with the same key.
    fn replace(&mut self, space: &str, row: Row) -> Result<()>;

    /// All rows of a space in insertion order.
    fn select(&self, space: &str) -> Result<Vec<Row>>;
}
