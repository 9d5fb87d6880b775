//! Store decorator that keeps the `property` catalog and `sequence` counters
//! in step with schema changes.
//!
//! Once both bookkeeping spaces exist, every property added to any other
//! space is also recorded as a `property` row `[id, space, index, name, type]`
//! whose id is drawn from the `property` sequence.

use spacemap_store::{
    IndexDescriptor, Result, Row, SchemaStore, Space, StorageType, StoreError, Value,
};
use tracing::debug;

use crate::bootstrap::{PROPERTY_SPACE, SEQUENCE_SPACE};

/// Field positions of a `sequence` row.
const SEQ_ID: usize = 0;
const SEQ_SPACE: usize = 1;
const SEQ_VALUE: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct CatalogStore<S> {
    inner: S,
}

impl<S: SchemaStore> CatalogStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn is_catalogued(&self) -> bool {
        self.inner.has_space(SEQUENCE_SPACE) && self.inner.has_space(PROPERTY_SPACE)
    }

    /// Advance and return the id counter of `space`.
    ///
    /// A space without a counter row gets one starting at 1.
    pub fn next_id(&mut self, space: &str) -> Result<u64> {
        let space_id = u64::from(self.inner.space_id(space)?);
        let rows = self.inner.select(SEQUENCE_SPACE)?;

        let mut last_row_id = 0;
        for row in rows {
            let row_id = sequence_field(&row, SEQ_ID)?;
            last_row_id = last_row_id.max(row_id);
            if sequence_field(&row, SEQ_SPACE)? != space_id {
                continue;
            }

            let next = sequence_field(&row, SEQ_VALUE)? + 1;
            self.inner.replace(
                SEQUENCE_SPACE,
                vec![Value::from(row_id), Value::from(space_id), Value::from(next)],
            )?;
            debug!(space, id = next, "Sequence advanced");
            return Ok(next);
        }

        self.inner.insert(
            SEQUENCE_SPACE,
            vec![
                Value::from(last_row_id + 1),
                Value::from(space_id),
                Value::from(1u64),
            ],
        )?;
        debug!(space, "Sequence started");
        Ok(1)
    }

    /// Write the catalog row of a property about to be added to `space`.
    ///
    /// Runs before the property lands so a failure leaves neither behind.
    fn record_property(&mut self, space: &str, name: &str, storage_type: StorageType) -> Result<()> {
        let current = self.inner.space(space)?;
        if current.has_property(name) {
            return Err(StoreError::PropertyExists {
                space: space.to_string(),
                property: name.to_string(),
            });
        }
        let space_id = current.id();
        let ordinal = current.properties().len() as u64;

        let id = self.next_id(PROPERTY_SPACE)?;
        self.inner.insert(
            PROPERTY_SPACE,
            vec![
                Value::from(id),
                Value::from(space_id),
                Value::from(ordinal),
                Value::from(name),
                Value::from(storage_type.as_str()),
            ],
        )?;
        debug!(space, property = name, id, "Property catalogued");
        Ok(())
    }
}

fn sequence_field(row: &Row, position: usize) -> Result<u64> {
    row.get(position)
        .and_then(Value::as_u64)
        .ok_or_else(|| StoreError::InvalidRow {
            space: SEQUENCE_SPACE.to_string(),
            reason: format!("field {position} is not an unsigned integer"),
        })
}

impl<S: SchemaStore> SchemaStore for CatalogStore<S> {
    fn has_space(&self, name: &str) -> bool {
        self.inner.has_space(name)
    }

    fn create_space(&mut self, name: &str) -> Result<&Space> {
        self.inner.create_space(name)
    }

    fn space(&self, name: &str) -> Result<&Space> {
        self.inner.space(name)
    }

    fn spaces(&self) -> Vec<&Space> {
        self.inner.spaces()
    }

    fn add_property(&mut self, space: &str, name: &str, storage_type: StorageType) -> Result<()> {
        if space != SEQUENCE_SPACE && space != PROPERTY_SPACE && self.is_catalogued() {
            self.record_property(space, name, storage_type)?;
        }
        self.inner.add_property(space, name, storage_type)
    }

    fn add_index(&mut self, space: &str, descriptor: &IndexDescriptor) -> Result<bool> {
        self.inner.add_index(space, descriptor)
    }

    fn insert(&mut self, space: &str, row: Row) -> Result<()> {
        self.inner.insert(space, row)
    }

    fn replace(&mut self, space: &str, row: Row) -> Result<()> {
        self.inner.replace(space, row)
    }

    fn select(&self, space: &str) -> Result<Vec<Row>> {
        self.inner.select(space)
    }
}
