//! # Pool Configuration
//!
//! Settings applied when an [`ObjectPool`](crate::pool::ObjectPool) is created.
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```toml
//! container_name = "ProjectilePool"
//! hide_container = true
//! ```

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Name given to the container node when nothing else is configured
pub const DEFAULT_CONTAINER_NAME: &str = "ObjectPool";

/// Pool creation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Name of the node that parents every free instance
    pub container_name: String,
    /// Whether the container survives scene transitions from the start
    pub persistent: bool,
    /// Hide the container from hierarchy views in addition to excluding it from saves
    pub hide_container: bool,
    /// Exclude every constructed instance from scene saves
    pub instances_dont_save: bool,
    /// Capacity reserved for each newly created bucket
    pub initial_bucket_capacity: usize,
}

impl PoolConfig {
    /// Create a configuration with a custom container name
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            ..Default::default()
        }
    }

    /// Set whether the container starts out persistent
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Set whether the container is hidden from hierarchy views
    pub fn with_hidden_container(mut self, hidden: bool) -> Self {
        self.hide_container = hidden;
        self
    }

    /// Set whether constructed instances are excluded from saves
    pub fn with_instances_dont_save(mut self, dont_save: bool) -> Self {
        self.instances_dont_save = dont_save;
        self
    }

    /// Reserve capacity for each new bucket
    pub fn with_initial_bucket_capacity(mut self, capacity: usize) -> Self {
        self.initial_bucket_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container_name.trim().is_empty() {
            return Err(ConfigError::Invalid("Container name cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            persistent: true,
            hide_container: false,
            instances_dont_save: true,
            initial_bucket_capacity: 0,
        }
    }
}

impl Config for PoolConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(file_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("prefab_pool_{}_{}", std::process::id(), file_name))
    }

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.container_name, "ObjectPool");
        assert!(config.persistent);
        assert!(!config.hide_container);
        assert!(config.instances_dont_save);
        assert_eq!(config.initial_bucket_capacity, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PoolConfig = toml::from_str("hide_container = true\n").unwrap();
        assert!(config.hide_container);
        assert_eq!(config.container_name, DEFAULT_CONTAINER_NAME);
        assert!(config.persistent);
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = PoolConfig::new("  ");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_file_round_trip() {
        let path = temp_path("pool.toml");
        let path_str = path.to_str().unwrap();
        let config = PoolConfig::new("Projectiles")
            .with_persistent(false)
            .with_initial_bucket_capacity(32);

        config.save_to_file(path_str).unwrap();
        let loaded = PoolConfig::load_from_file(path_str).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_file_round_trip() {
        let path = temp_path("pool.ron");
        let path_str = path.to_str().unwrap();
        let config = PoolConfig::new("Effects").with_hidden_container(true);

        config.save_to_file(path_str).unwrap();
        let loaded = PoolConfig::load_from_file(path_str).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension() {
        let result = PoolConfig::load_from_file("pool.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));

        let save = PoolConfig::default().save_to_file("pool.yaml");
        assert!(matches!(save, Err(ConfigError::UnsupportedFormat(_))));
    }
}
