//! Seeds the bookkeeping spaces every database starts with.
//!
//! `sequence` holds per-space id counters, `property` is the self-describing
//! catalog of every space's properties (including its own). The seed rows are
//! fixed so existing catalogs stay compatible. Once `sequence` exists the
//! bootstrap does nothing.

use spacemap_store::{IndexDescriptor, Row, StorageType, Value};
use tracing::debug;

use crate::error::Result;
use crate::migration::{Meta, Migration};

pub const SEQUENCE_SPACE: &str = "sequence";
pub const PROPERTY_SPACE: &str = "property";

/// `(id, space, index, name, type)` rows describing both bookkeeping spaces.
const CATALOG_ROWS: [(u64, &str, u64, &str, &str); 8] = [
    (1, SEQUENCE_SPACE, 0, "id", "integer"),
    (2, SEQUENCE_SPACE, 1, "space", "integer"),
    (3, SEQUENCE_SPACE, 2, "value", "integer"),
    (4, PROPERTY_SPACE, 0, "id", "integer"),
    (5, PROPERTY_SPACE, 1, "space", "integer"),
    (6, PROPERTY_SPACE, 2, "index", "integer"),
    (7, PROPERTY_SPACE, 3, "name", "string"),
    (8, PROPERTY_SPACE, 4, "type", "string"),
];

/// `(id, space, value)` counters: last id used in each bookkeeping space.
const SEQUENCE_ROWS: [(u64, &str, u64); 2] = [(1, SEQUENCE_SPACE, 2), (2, PROPERTY_SPACE, 8)];

#[derive(Debug, Default, Clone, Copy)]
pub struct Bootstrap;

impl Migration for Bootstrap {
    fn name(&self) -> &str {
        "bootstrap"
    }

    fn migrate(&self, meta: &mut Meta<'_>) -> Result<()> {
        if meta.has_space(SEQUENCE_SPACE) {
            debug!("Bookkeeping spaces exist, skipping bootstrap");
            return Ok(());
        }

        meta.ensure_space(SEQUENCE_SPACE)?
            .add_typed_property("id", StorageType::Unsigned)?
            .add_typed_property("space", StorageType::Unsigned)?
            .add_typed_property("value", StorageType::Unsigned)?
            .add_index(IndexDescriptor::new(["id"]))?
            .add_index(IndexDescriptor::new(["space"]))?;

        meta.ensure_space(PROPERTY_SPACE)?
            .add_typed_property("id", StorageType::Unsigned)?
            .add_typed_property("space", StorageType::Unsigned)?
            .add_typed_property("index", StorageType::Unsigned)?
            .add_typed_property("name", StorageType::Str)?
            .add_typed_property("type", StorageType::Str)?
            .add_index(IndexDescriptor::new(["id"]))?
            .add_index(IndexDescriptor::new(["space"]).non_unique())?
            .add_index(IndexDescriptor::new(["index", "space"]).named("index_space"))?
            .add_index(IndexDescriptor::new(["type"]).non_unique())?;

        for (id, space, index, name, kind) in CATALOG_ROWS {
            let space_id = meta.space_id(space)?;
            let row: Row = vec![
                Value::from(id),
                Value::from(space_id),
                Value::from(index),
                Value::from(name),
                Value::from(kind),
            ];
            meta.insert(PROPERTY_SPACE, row)?;
        }

        for (id, space, value) in SEQUENCE_ROWS {
            let space_id = meta.space_id(space)?;
            meta.insert(
                SEQUENCE_SPACE,
                vec![Value::from(id), Value::from(space_id), Value::from(value)],
            )?;
        }

        Ok(())
    }
}
