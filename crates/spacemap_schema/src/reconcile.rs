//! Reconciliation engine
//!
//! Converges the store's schema towards the registered declarations in three
//! phases:
//!
//! 1. **Entities**: create missing spaces, add missing properties
//! 2. **Repositories**: add declared indexes (`if_not_exists`)
//! 3. **Primary indexes**: every space without an index gets a unique `id` index
//!
//! Spaces come before properties and properties before indexes, and every
//! mutation is gated by an existence check. Running `migrate` again with the
//! same declarations changes nothing and returns an empty report. Changes are
//! additive only: properties are never dropped or retyped.
//!
//! The first error aborts the run. Mutations already applied stay applied.

use serde::{Deserialize, Serialize};
use spacemap_store::{IndexDescriptor, SchemaStore, Space, StorageType};
use tracing::{debug, info};

use crate::error::{Result, SchemaError};
use crate::naming::NameCache;
use crate::registry::{ClassRegistry, RegisteredClass};
use crate::typing::TypeCache;

/// Property the default primary index is built on.
pub const PRIMARY_FIELD: &str = "id";

/// Optional capability that indexes hierarchical spaces itself.
pub trait HierarchyIndexer {
    fn is_nested(&self, space: &Space) -> bool;

    /// Create the hierarchy's structural indexes; returns the names created.
    fn add_indexes(&self, store: &mut dyn SchemaStore, space: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedProperty {
    pub space: String,
    pub property: String,
    pub storage_type: StorageType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIndex {
    pub space: String,
    pub index: String,
}

/// Everything a migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub spaces_created: Vec<String>,
    pub properties_added: Vec<AddedProperty>,
    pub indexes_created: Vec<CreatedIndex>,
    pub rows_seeded: usize,
}

impl MigrationReport {
    /// True when the run was a no-op.
    pub fn is_empty(&self) -> bool {
        self.spaces_created.is_empty()
            && self.properties_added.is_empty()
            && self.indexes_created.is_empty()
            && self.rows_seeded == 0
    }

    pub fn merge(&mut self, other: MigrationReport) {
        self.spaces_created.extend(other.spaces_created);
        self.properties_added.extend(other.properties_added);
        self.indexes_created.extend(other.indexes_created);
        self.rows_seeded += other.rows_seeded;
    }

    pub(crate) fn space(&mut self, space: &str) {
        self.spaces_created.push(space.to_string());
    }

    pub(crate) fn property(&mut self, space: &str, property: &str, storage_type: StorageType) {
        self.properties_added.push(AddedProperty {
            space: space.to_string(),
            property: property.to_string(),
            storage_type,
        });
    }

    pub(crate) fn index(&mut self, space: &str, index: impl Into<String>) {
        self.indexes_created.push(CreatedIndex {
            space: space.to_string(),
            index: index.into(),
        });
    }
}

/// Give `space` a unique index over `id` if it has no index yet.
///
/// Returns the created index name, `None` when the space was already indexed.
pub fn ensure_primary_index(store: &mut dyn SchemaStore, space: &str) -> Result<Option<String>> {
    let current = store.space(space)?;
    if !current.indexes().is_empty() {
        return Ok(None);
    }
    if !current.has_property(PRIMARY_FIELD) {
        return Err(SchemaError::NoPrimaryIndex {
            space: space.to_string(),
        });
    }

    let descriptor = IndexDescriptor::new([PRIMARY_FIELD]);
    store.add_index(space, &descriptor)?;
    info!(space, index = PRIMARY_FIELD, "Created primary index");
    Ok(Some(descriptor.resolved_name()))
}

/// Stateless apart from its memo caches; safe to run repeatedly.
#[derive(Default)]
pub struct Reconciler {
    names: NameCache,
    types: TypeCache,
    hierarchy: Option<Box<dyn HierarchyIndexer>>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hierarchy(mut self, indexer: impl HierarchyIndexer + 'static) -> Self {
        self.hierarchy = Some(Box::new(indexer));
        self
    }

    pub fn migrate(
        &mut self,
        registry: &ClassRegistry,
        store: &mut dyn SchemaStore,
    ) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        for class in registry.entities() {
            self.reconcile_entity(class, store, &mut report)?;
        }
        for class in registry.repositories() {
            self.reconcile_repository(class, store, &mut report)?;
        }
        self.ensure_primary_indexes(store, &mut report)?;

        info!(
            spaces = report.spaces_created.len(),
            properties = report.properties_added.len(),
            indexes = report.indexes_created.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    fn reconcile_entity(
        &mut self,
        class: &RegisteredClass,
        store: &mut dyn SchemaStore,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let decl = &class.declaration;
        let space = class.space.as_str();

        if store.has_space(space) {
            debug!(space, class = %decl.name, "Space exists");
        } else {
            store.create_space(space)?;
            info!(space, class = %decl.name, "Created space");
            report.space(space);
        }

        for property in decl.properties.iter().filter(|p| p.is_public()) {
            let doc_type = match property.types.as_slice() {
                [single] => single.as_str(),
                [] => {
                    return Err(SchemaError::MissingTypeAnnotation {
                        class: decl.name.clone(),
                        property: property.name.clone(),
                    })
                }
                many => {
                    return Err(SchemaError::AmbiguousTypeAnnotation {
                        class: decl.name.clone(),
                        property: property.name.clone(),
                        count: many.len(),
                    })
                }
            };

            let name = self.names.normalize(&property.name)?;
            let storage_type = self.types.resolve(doc_type);

            if store.space(space)?.has_property(&name) {
                debug!(space, property = %name, "Property exists");
                continue;
            }
            store.add_property(space, &name, storage_type)?;
            info!(space, property = %name, storage_type = %storage_type, "Added property");
            report.property(space, &name, storage_type);
        }

        if let Some(indexer) = &self.hierarchy {
            if indexer.is_nested(store.space(space)?) {
                for index in indexer.add_indexes(store, space)? {
                    report.index(space, index);
                }
            }
        }

        Ok(())
    }

    fn reconcile_repository(
        &mut self,
        class: &RegisteredClass,
        store: &mut dyn SchemaStore,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let decl = &class.declaration;
        let space = class.space.as_str();

        if !store.has_space(space) {
            return Err(SchemaError::MissingEntityDefinition {
                repository: decl.name.clone(),
                space: space.to_string(),
            });
        }

        let Some(indexes) = &decl.indexes else {
            debug!(space, repository = %decl.name, "No default indexes declared");
            return Ok(());
        };

        for index in indexes {
            let descriptor = index.to_descriptor();
            let name = descriptor.resolved_name();
            if store.add_index(space, &descriptor)? {
                info!(space, index = %name, fields = ?descriptor.fields, "Created index");
                report.index(space, name);
            } else {
                debug!(space, index = %name, "Index exists");
            }
        }

        Ok(())
    }

    fn ensure_primary_indexes(
        &mut self,
        store: &mut dyn SchemaStore,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let unindexed: Vec<String> = store
            .spaces()
            .into_iter()
            .filter(|s| s.indexes().is_empty())
            .map(|s| s.name().to_string())
            .collect();

        for space in unindexed {
            if let Some(index) = ensure_primary_index(store, &space)? {
                report.index(&space, index);
            }
        }
        Ok(())
    }
}
