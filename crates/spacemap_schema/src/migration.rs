//! Imperative migrations over the schema store.
//!
//! Declarations cover most schema changes; a [`Migration`] covers the rest:
//! seeding rows, creating spaces no class declares, adding indexes by hand.
//! Every `Meta` operation is gated by an existence check, so migrations are
//! expected to be re-runnable.

use spacemap_store::{IndexDescriptor, Row, SchemaStore, StorageType};
use tracing::{debug, info};

use crate::error::Result;
use crate::reconcile::{ensure_primary_index, MigrationReport, PRIMARY_FIELD};

pub trait Migration {
    fn name(&self) -> &str;

    fn migrate(&self, meta: &mut Meta<'_>) -> Result<()>;
}

/// Schema editing API handed to migrations.
pub struct Meta<'a> {
    store: &'a mut dyn SchemaStore,
    report: MigrationReport,
}

impl<'a> Meta<'a> {
    pub fn new(store: &'a mut dyn SchemaStore) -> Self {
        Self {
            store,
            report: MigrationReport::default(),
        }
    }

    pub fn has_space(&self, name: &str) -> bool {
        self.store.has_space(name)
    }

    pub fn space_id(&self, name: &str) -> Result<u32> {
        Ok(self.store.space_id(name)?)
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &dyn SchemaStore {
        &*self.store
    }

    /// Create `name` if missing, with no properties or indexes.
    pub fn ensure_space(&mut self, name: &str) -> Result<MetaSpace<'_, 'a>> {
        if !self.store.has_space(name) {
            self.store.create_space(name)?;
            info!(space = name, "Created space");
            self.report.space(name);
        }
        Ok(MetaSpace {
            meta: self,
            name: name.to_string(),
        })
    }

    /// Create an entity space: an unsigned `id` primary key followed by
    /// string `fields`.
    pub fn create(&mut self, name: &str, fields: &[&str]) -> Result<MetaSpace<'_, 'a>> {
        let mut space = self.ensure_space(name)?;
        space.add_typed_property(PRIMARY_FIELD, StorageType::Unsigned)?;
        for field in fields {
            space.add_property(field)?;
        }
        space.ensure_primary_index()?;
        Ok(space)
    }

    /// Handle to an existing space.
    pub fn space(&mut self, name: &str) -> Result<MetaSpace<'_, 'a>> {
        self.store.space(name)?;
        Ok(MetaSpace {
            meta: self,
            name: name.to_string(),
        })
    }

    pub fn insert(&mut self, space: &str, row: Row) -> Result<()> {
        self.store.insert(space, row)?;
        self.report.rows_seeded += 1;
        Ok(())
    }

    pub fn into_report(self) -> MigrationReport {
        self.report
    }
}

/// A space being edited through [`Meta`].
pub struct MetaSpace<'m, 'a> {
    meta: &'m mut Meta<'a>,
    name: String,
}

impl<'m, 'a> MetaSpace<'m, 'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a string property unless present.
    pub fn add_property(&mut self, name: &str) -> Result<&mut Self> {
        self.add_typed_property(name, StorageType::Str)
    }

    /// Add a property unless present; an existing property keeps its type.
    pub fn add_typed_property(&mut self, name: &str, storage_type: StorageType) -> Result<&mut Self> {
        let store = &mut *self.meta.store;
        if store.space(&self.name)?.has_property(name) {
            debug!(space = %self.name, property = name, "Property exists");
            return Ok(self);
        }
        store.add_property(&self.name, name, storage_type)?;
        info!(space = %self.name, property = name, storage_type = %storage_type, "Added property");
        self.meta.report.property(&self.name, name, storage_type);
        Ok(self)
    }

    pub fn add_index(&mut self, descriptor: IndexDescriptor) -> Result<&mut Self> {
        let name = descriptor.resolved_name();
        if self.meta.store.add_index(&self.name, &descriptor)? {
            info!(space = %self.name, index = %name, "Created index");
            self.meta.report.index(&self.name, name);
        }
        Ok(self)
    }

    fn ensure_primary_index(&mut self) -> Result<&mut Self> {
        if let Some(index) = ensure_primary_index(&mut *self.meta.store, &self.name)? {
            self.meta.report.index(&self.name, index);
        }
        Ok(self)
    }
}
