//! Nested-set trees: structural indexes for hierarchical spaces.

use spacemap_store::{IndexDescriptor, SchemaStore, Space};
use tracing::info;

use crate::error::Result;
use crate::reconcile::{ensure_primary_index, HierarchyIndexer};

/// Properties that mark a space as a nested-set tree.
pub const NESTED_FIELDS: [&str; 5] = ["parent", "root", "depth", "left", "right"];

#[derive(Debug, Default, Clone, Copy)]
pub struct NestedSet;

impl NestedSet {
    fn structural_indexes() -> [IndexDescriptor; 3] {
        [
            IndexDescriptor::new(["parent"]).non_unique().if_not_exists(),
            IndexDescriptor::new(["root", "left"]).if_not_exists(),
            IndexDescriptor::new(["root", "right"]).if_not_exists(),
        ]
    }
}

impl HierarchyIndexer for NestedSet {
    fn is_nested(&self, space: &Space) -> bool {
        NESTED_FIELDS.iter().all(|field| space.has_property(field))
    }

    fn add_indexes(&self, store: &mut dyn SchemaStore, space: &str) -> Result<Vec<String>> {
        let mut created = Vec::new();

        // structural indexes are secondary; the tree still needs its id primary
        if let Some(primary) = ensure_primary_index(store, space)? {
            created.push(primary);
        }

        for descriptor in Self::structural_indexes() {
            if store.add_index(space, &descriptor)? {
                let name = descriptor.resolved_name();
                info!(space, index = %name, "Created nested set index");
                created.push(name);
            }
        }
        Ok(created)
    }
}
