//! Declarative schema reconciliation
//!
//! # Lifecycle
//!
//! 1. **Declare**: entity classes list typed public properties, repository
//!    classes list default indexes for the entity's space
//! 2. **Register**: classes map to canonical snake_case space names
//! 3. **Migrate**: the store is bootstrapped, queued migrations run, then the
//!    [`Reconciler`] adds whatever spaces, properties and indexes are missing
//!
//! Migration is additive and idempotent. Nothing is ever dropped or retyped,
//! and a second run over the same declarations changes nothing.
//!
//! # Modules
//!
//! - [`declaration`]: class declarations and the JSON manifest format
//! - [`registry`]: class registration and space naming
//! - [`naming`] / [`typing`]: identifier normalization and type resolution
//! - [`reconcile`]: the three-phase reconciliation engine
//! - [`migration`] / [`bootstrap`]: imperative migrations and the seed schema
//! - [`catalog`]: store decorator maintaining the property catalog
//! - [`nested`]: structural indexes for nested-set trees
//! - [`mapper`]: facade tying it all to one store

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod declaration;
pub mod error;
pub mod mapper;
pub mod migration;
pub mod naming;
pub mod nested;
pub mod reconcile;
pub mod registry;
pub mod typing;

pub use bootstrap::{Bootstrap, PROPERTY_SPACE, SEQUENCE_SPACE};
pub use catalog::CatalogStore;
pub use config::MapperConfig;
pub use declaration::{
    ClassDeclaration, ClassKind, Declare, DeclarationManifest, DeclaredProperty, IndexDeclaration,
    Visibility,
};
pub use error::{Result, SchemaError};
pub use mapper::Mapper;
pub use migration::{Meta, MetaSpace, Migration};
pub use naming::{to_underscore, NameCache};
pub use nested::{NestedSet, NESTED_FIELDS};
pub use reconcile::{
    ensure_primary_index, AddedProperty, CreatedIndex, HierarchyIndexer, MigrationReport,
    Reconciler, PRIMARY_FIELD,
};
pub use registry::{ClassRegistry, NoSpaces, RegisteredClass, SpaceValidator};
pub use typing::{resolve_storage_type, TypeCache};
