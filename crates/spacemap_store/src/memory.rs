//! In-memory schema store with JSON snapshot persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::SchemaStore;
use crate::types::{IndexDescriptor, Row, Space, StorageType};

/// First id handed out to user-created spaces.
pub const FIRST_SPACE_ID: u32 = 512;

/// Schema store held entirely in memory.
///
/// Use [`MemoryStore::load`] / [`MemoryStore::save`] to keep state between
/// runs in a JSON snapshot file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    spaces: Vec<Space>,
    rows: BTreeMap<String, Vec<Row>>,
}

/// On-disk snapshot layout.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    saved_at: DateTime<Utc>,
    #[serde(default)]
    spaces: Vec<Space>,
    #[serde(default)]
    rows: BTreeMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No snapshot found, starting empty");
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path)?;
        let mut snapshot: Snapshot = serde_json::from_str(&raw)?;
        snapshot.spaces.sort_by_key(Space::id);

        info!(
            path = %path.display(),
            spaces = snapshot.spaces.len(),
            saved_at = %snapshot.saved_at,
            "Snapshot loaded"
        );
        Ok(Self {
            spaces: snapshot.spaces,
            rows: snapshot.rows,
        })
    }

    /// Write the store to a snapshot file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = Snapshot {
            saved_at: Utc::now(),
            spaces: self.spaces.clone(),
            rows: self.rows.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;

        info!(path = %path.display(), spaces = self.spaces.len(), "Snapshot saved");
        Ok(())
    }

    fn next_space_id(&self) -> u32 {
        self.spaces
            .iter()
            .map(|s| s.id() + 1)
            .max()
            .unwrap_or(FIRST_SPACE_ID)
            .max(FIRST_SPACE_ID)
    }

    fn space_mut(&mut self, name: &str) -> Result<&mut Space> {
        self.spaces
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| StoreError::space_not_found(name))
    }

    fn check_row(&self, space: &str, row: &Row) -> Result<()> {
        let expected = self.space(space)?.properties().len();
        if row.is_empty() || (expected > 0 && row.len() > expected) {
            return Err(StoreError::RowArity {
                space: space.to_string(),
                expected,
                got: row.len(),
            });
        }
        Ok(())
    }
}

impl SchemaStore for MemoryStore {
    fn has_space(&self, name: &str) -> bool {
        self.spaces.iter().any(|s| s.name() == name)
    }

    fn create_space(&mut self, name: &str) -> Result<&Space> {
        if self.has_space(name) {
            return Err(StoreError::SpaceExists(name.to_string()));
        }

        let id = self.next_space_id();
        self.spaces.push(Space::new(id, name));
        debug!(space = name, id, "Space created");
        self.space(name)
    }

    fn space(&self, name: &str) -> Result<&Space> {
        self.spaces
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| StoreError::space_not_found(name))
    }

    fn spaces(&self) -> Vec<&Space> {
        self.spaces.iter().collect()
    }

    fn add_property(&mut self, space: &str, name: &str, storage_type: StorageType) -> Result<()> {
        self.space_mut(space)?.add_property(name, storage_type)?;
        Ok(())
    }

    fn add_index(&mut self, space: &str, descriptor: &IndexDescriptor) -> Result<bool> {
        self.space_mut(space)?.add_index(descriptor)
    }

    fn insert(&mut self, space: &str, row: Row) -> Result<()> {
        self.check_row(space, &row)?;

        let rows = self.rows.entry(space.to_string()).or_default();
        if rows.iter().any(|r| r.first() == row.first()) {
            let key = row.first().map(ToString::to_string).unwrap_or_default();
            return Err(StoreError::DuplicateKey {
                space: space.to_string(),
                key,
            });
        }
        rows.push(row);
        Ok(())
    }

    fn replace(&mut self, space: &str, row: Row) -> Result<()> {
        self.check_row(space, &row)?;

        let rows = self.rows.entry(space.to_string()).or_default();
        match rows.iter_mut().find(|r| r.first() == row.first()) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    fn select(&self, space: &str) -> Result<Vec<Row>> {
        self.space(space)?;
        Ok(self.rows.get(space).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_space_ids_start_at_user_range() {
        let mut store = MemoryStore::new();
        assert_eq!(store.create_space("sequence").unwrap().id(), FIRST_SPACE_ID);
        assert_eq!(store.create_space("property").unwrap().id(), FIRST_SPACE_ID + 1);
        assert_eq!(store.space_id("property").unwrap(), 513);
    }

    #[test]
    fn test_create_space_twice_fails() {
        let mut store = MemoryStore::new();
        store.create_space("person").unwrap();
        let err = store.create_space("person").unwrap_err();
        assert!(matches!(err, StoreError::SpaceExists(_)));
    }

    #[test]
    fn test_missing_space() {
        let mut store = MemoryStore::new();
        assert!(!store.has_space("ghost"));
        assert!(matches!(
            store.add_property("ghost", "id", StorageType::Unsigned),
            Err(StoreError::SpaceNotFound(_))
        ));
        assert!(store.select("ghost").is_err());
    }

    #[test]
    fn test_insert_and_replace_by_first_field() {
        let mut store = MemoryStore::new();
        store.create_space("sequence").unwrap();
        for name in ["id", "space", "value"] {
            store.add_property("sequence", name, StorageType::Unsigned).unwrap();
        }

        store
            .insert("sequence", vec![Value::from(1u64), Value::from(512u64), Value::from(2u64)])
            .unwrap();
        let err = store
            .insert("sequence", vec![Value::from(1u64), Value::from(512u64), Value::from(3u64)])
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        store
            .replace("sequence", vec![Value::from(1u64), Value::from(512u64), Value::from(3u64)])
            .unwrap();
        let rows = store.select("sequence").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], Value::Unsigned(3));
    }

    #[test]
    fn test_row_arity_checked() {
        let mut store = MemoryStore::new();
        store.create_space("tiny").unwrap();
        store.add_property("tiny", "id", StorageType::Unsigned).unwrap();

        let err = store
            .insert("tiny", vec![Value::from(1u64), Value::from("extra")])
            .unwrap_err();
        assert!(matches!(err, StoreError::RowArity { expected: 1, got: 2, .. }));
        assert!(store.insert("tiny", Vec::new()).is_err());
    }
}
