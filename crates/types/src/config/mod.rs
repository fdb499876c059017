//! Configuration types for ramdisk volumes.
//!
//! Configuration is loaded from TOML files. All config structs validate their
//! values at construction time via fallible builders. Post-deserialization
//! validation is available via the `validate()` method on each struct.

// The schemars `JsonSchema` derive macro internally uses `.unwrap()` in its
// expansions.
#![allow(clippy::disallowed_methods)]

mod limits;
mod storage;

pub use limits::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
pub use storage::*;

/// Configuration validation error.
///
/// Returned when a configuration value is outside its valid range or
/// violates a cross-field constraint.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[snafu(display("invalid config: {message}"))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// The configuration text could not be parsed.
    #[snafu(display("invalid config syntax: {message}"))]
    Parse {
        /// Parser diagnostic.
        message: String,
    },
}

/// Top-level configuration.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, bon::Builder,
)]
pub struct RamdiskConfig {
    /// Admission limits.
    #[serde(default)]
    #[builder(default)]
    pub limits: LimitsConfig,
    /// Storage settings.
    #[serde(default)]
    #[builder(default)]
    pub storage: StorageConfig,
}

impl RamdiskConfig {
    /// Parses and validates a TOML document. Missing sections take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown value types,
    /// and [`ConfigError::Validation`] if a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ConfigError::Parse { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse { message: e.to_string() })
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Validation`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.storage.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // =========================================================================
    // LimitsConfig
    // =========================================================================

    #[test]
    fn test_limits_config_defaults_are_valid() {
        let config = LimitsConfig::builder().build().expect("defaults should be valid");
        assert_eq!(config, LimitsConfig::default());
        assert_eq!(config.max_node_bytes, 64_000);
        assert_eq!(config.max_actions_per_transaction, 64);
    }

    #[test]
    fn test_limits_config_zero_rejected() {
        let err = LimitsConfig::builder().max_node_bytes(0).build().unwrap_err();
        assert!(err.to_string().contains("max_node_bytes"));

        let err = LimitsConfig::builder().max_actions_per_transaction(0).build().unwrap_err();
        assert!(err.to_string().contains("max_actions_per_transaction"));
    }

    #[test]
    fn test_limits_config_serde_defaults() {
        let config: LimitsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LimitsConfig::default());
    }

    #[test]
    fn test_limits_config_validate_method() {
        let config = LimitsConfig { max_node_bytes: 0, ..LimitsConfig::default() };
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // StorageConfig
    // =========================================================================

    #[test]
    fn test_storage_config_defaults_are_valid() {
        let config = StorageConfig::builder().build().expect("defaults should be valid");
        assert_eq!(config.file_name, "ramdisk.db");
        assert!(config.sync_on_commit);
    }

    #[test]
    fn test_storage_config_rejects_bad_file_names() {
        assert!(StorageConfig::builder().file_name(String::new()).build().is_err());
        let err = StorageConfig::builder().file_name("a/b.db".to_string()).build().unwrap_err();
        assert!(err.to_string().contains("path separator"));
    }

    // =========================================================================
    // RamdiskConfig
    // =========================================================================

    #[test]
    fn test_config_from_empty_toml_uses_defaults() {
        let config = RamdiskConfig::from_toml_str("").unwrap();
        assert_eq!(config, RamdiskConfig::default());
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config = RamdiskConfig::from_toml_str(
            r#"
            [limits]
            max_node_bytes = 1024

            [storage]
            sync_on_commit = false
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_node_bytes, 1024);
        assert_eq!(config.limits.max_actions_per_transaction, 64);
        assert!(!config.storage.sync_on_commit);
        assert_eq!(config.storage.file_name, "ramdisk.db");
    }

    #[test]
    fn test_config_from_toml_validates() {
        let err = RamdiskConfig::from_toml_str("[limits]\nmax_node_bytes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));

        let err = RamdiskConfig::from_toml_str("[limits]\nmax_node_bytes = \"big\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = RamdiskConfig::builder()
            .limits(LimitsConfig::builder().max_node_bytes(10).build().unwrap())
            .build();
        let text = config.to_toml_string().unwrap();
        assert_eq!(RamdiskConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_config_json_schema_lists_sections() {
        let schema = schemars::schema_for!(RamdiskConfig);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("limits"));
        assert!(json.contains("max_node_bytes"));
        assert!(json.contains("sync_on_commit"));
    }
}
