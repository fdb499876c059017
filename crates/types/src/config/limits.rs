//! Admission limits for actions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default maximum node size: 64,000 bytes.
///
/// Hex-encoding a node for a command line doubles it to 128,000 characters,
/// which leaves room for the rest of the command under a 128 KiB limit.
const fn default_max_node_bytes() -> usize {
    64_000
}

/// Default maximum number of actions per transaction.
const fn default_max_actions_per_transaction() -> usize {
    64
}

/// Admission limits applied before an action touches storage.
///
/// # Example
///
/// ```no_run
/// # use ramdisk_types::config::LimitsConfig;
/// let config = LimitsConfig::builder()
///     .max_node_bytes(1024 * 1024)
///     .build()
///     .expect("valid limits config");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LimitsConfig {
    /// Maximum node data size in bytes.
    ///
    /// Larger `set_node` payloads are rejected. Must be >= 1. Default: 64,000.
    #[serde(default = "default_max_node_bytes")]
    pub max_node_bytes: usize,
    /// Maximum number of actions in one transaction.
    ///
    /// Must be >= 1. Default: 64.
    #[serde(default = "default_max_actions_per_transaction")]
    pub max_actions_per_transaction: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_node_bytes: default_max_node_bytes(),
            max_actions_per_transaction: default_max_actions_per_transaction(),
        }
    }
}

#[bon::bon]
impl LimitsConfig {
    /// Creates a new limits configuration, verifying all limits are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any limit is zero.
    #[builder]
    pub fn new(
        #[builder(default = default_max_node_bytes())] max_node_bytes: usize,
        #[builder(default = default_max_actions_per_transaction())]
        max_actions_per_transaction: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self { max_node_bytes, max_actions_per_transaction };
        config.validate()?;
        Ok(config)
    }
}

impl LimitsConfig {
    /// Validates the configuration values.
    ///
    /// Call after deserialization to ensure all limits are positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_node_bytes == 0 {
            return Err(ConfigError::Validation {
                message: "max_node_bytes must be >= 1".to_string(),
            });
        }
        if self.max_actions_per_transaction == 0 {
            return Err(ConfigError::Validation {
                message: "max_actions_per_transaction must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}
