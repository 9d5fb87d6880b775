//! Facade wiring registry, migrations and reconciler around one store.

use spacemap_store::SchemaStore;
use tracing::info;

use crate::bootstrap::Bootstrap;
use crate::catalog::CatalogStore;
use crate::config::MapperConfig;
use crate::declaration::{ClassDeclaration, Declare};
use crate::error::Result;
use crate::migration::{Meta, Migration};
use crate::nested::NestedSet;
use crate::reconcile::{MigrationReport, Reconciler};
use crate::registry::ClassRegistry;

/// Owns a store and everything needed to migrate it.
///
/// ```rust,ignore
/// let mut mapper = Mapper::new(MemoryStore::new(), MapperConfig::default())?;
/// mapper.register(ClassDeclaration::entity("Person").property("id", "int"))?;
/// let report = mapper.migrate()?;
/// ```
pub struct Mapper<S: SchemaStore> {
    store: CatalogStore<S>,
    registry: ClassRegistry,
    reconciler: Reconciler,
    migrations: Vec<Box<dyn Migration>>,
    config: MapperConfig,
}

impl<S: SchemaStore> Mapper<S> {
    pub fn new(store: S, config: MapperConfig) -> Result<Self> {
        let mut registry = ClassRegistry::new();
        registry
            .set_entity_postfix(config.entity_postfix.clone())?
            .set_repository_postfix(config.repository_postfix.clone())?;

        let reconciler = if config.nested_set {
            Reconciler::new().with_hierarchy(NestedSet)
        } else {
            Reconciler::new()
        };

        Ok(Self {
            store: CatalogStore::new(store),
            registry,
            reconciler,
            migrations: Vec::new(),
            config,
        })
    }

    pub fn register(&mut self, declaration: ClassDeclaration) -> Result<String> {
        self.registry.register(declaration)
    }

    pub fn register_type<T: Declare>(&mut self) -> Result<String> {
        self.registry.register_type::<T>()
    }

    /// Queue a migration to run before reconciliation, in insertion order.
    pub fn add_migration(&mut self, migration: impl Migration + 'static) -> &mut Self {
        self.migrations.push(Box::new(migration));
        self
    }

    /// Bootstrap (if enabled), run queued migrations, then reconcile the
    /// registered classes.
    pub fn migrate(&mut self) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        if self.config.bootstrap {
            report.merge(run_migration(&Bootstrap, &mut self.store)?);
        }
        for migration in &self.migrations {
            report.merge(run_migration(migration.as_ref(), &mut self.store)?);
        }
        report.merge(self.reconciler.migrate(&self.registry, &mut self.store)?);

        Ok(report)
    }

    /// Draw the next id from the `sequence` counter of `space`.
    pub fn next_id(&mut self, space: &str) -> Result<u64> {
        Ok(self.store.next_id(space)?)
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.store.inner()
    }

    pub fn into_store(self) -> S {
        self.store.into_inner()
    }
}

fn run_migration(migration: &dyn Migration, store: &mut dyn SchemaStore) -> Result<MigrationReport> {
    let mut meta = Meta::new(store);
    migration.migrate(&mut meta)?;
    let report = meta.into_report();
    if !report.is_empty() {
        info!(migration = migration.name(), changes = ?report, "Migration applied");
    }
    Ok(report)
}
