use serde::Deserialize;

use crate::error::StorageError;

///
/// Initial sizing of the storage
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Number of entity records to allocate up front
    pub entity_capacity: usize,
    /// Number of archetypes to allocate up front
    pub archetype_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            entity_capacity: 1024,
            archetype_capacity: 64,
        }
    }
}

impl StorageConfig {
    pub fn from_toml(text: &str) -> Result<Self, StorageError> {
        toml::from_str(text).map_err(|e| StorageError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::StorageConfig;

    #[test]
    fn defaults() {
        let config = StorageConfig::from_toml("").unwrap();
        assert_eq!(StorageConfig::default(), config);
    }

    #[test]
    fn partial() {
        let config = StorageConfig::from_toml("entity_capacity = 10").unwrap();
        assert_eq!(10, config.entity_capacity);
        assert_eq!(64, config.archetype_capacity);
    }

    #[test]
    fn invalid() {
        assert!(StorageConfig::from_toml("entity_capacity = \"many\"").is_err());
    }
}
