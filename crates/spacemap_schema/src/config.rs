//! Mapper configuration.

use serde::{Deserialize, Serialize};

/// Options controlling registration and migration.
///
/// Deserializes from partial documents; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Suffix stripped from entity class names before normalization
    pub entity_postfix: Option<String>,
    /// Suffix stripped from repository class names before normalization
    pub repository_postfix: Option<String>,
    /// Seed the `sequence` / `property` bookkeeping spaces before migrating
    pub bootstrap: bool,
    /// Give nested-set tree spaces their structural indexes
    pub nested_set: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            entity_postfix: None,
            repository_postfix: None,
            bootstrap: true,
            nested_set: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MapperConfig = serde_json::from_str(r#"{"entity_postfix": "Entity"}"#).unwrap();
        assert_eq!(config.entity_postfix.as_deref(), Some("Entity"));
        assert!(config.bootstrap);
        assert!(!config.nested_set);
    }
}
