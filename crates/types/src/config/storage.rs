//! Storage configuration for the snapshot-backed table store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Storage layer configuration.
///
/// # Validation Rules
///
/// - `file_name` must be non-empty and must not contain a path separator
///
/// # Example
///
/// ```no_run
/// # use ramdisk_types::config::StorageConfig;
/// let config = StorageConfig::builder()
///     .file_name("volumes.db".to_string())
///     .sync_on_commit(false)
///     .build()
///     .expect("valid storage config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// Database file name inside the data directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Whether every commit is fsynced before it becomes visible.
    ///
    /// Disabling trades durability for throughput. Default: true.
    #[serde(default = "default_sync_on_commit")]
    pub sync_on_commit: bool,
}

fn default_file_name() -> String {
    "ramdisk.db".to_string()
}

const fn default_sync_on_commit() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { file_name: default_file_name(), sync_on_commit: default_sync_on_commit() }
    }
}

#[bon::bon]
impl StorageConfig {
    /// Creates a new storage configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `file_name` is empty or contains
    /// a path separator.
    #[builder]
    pub fn new(
        #[builder(default = default_file_name())] file_name: String,
        #[builder(default = default_sync_on_commit())] sync_on_commit: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self { file_name, sync_on_commit };
        config.validate()?;
        Ok(config)
    }
}

impl StorageConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `file_name` is empty or contains
    /// a path separator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_name.is_empty() {
            return Err(ConfigError::Validation {
                message: "file_name must not be empty".to_string(),
            });
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(ConfigError::Validation {
                message: format!("file_name {:?} must not contain a path separator", self.file_name),
            });
        }
        Ok(())
    }
}
