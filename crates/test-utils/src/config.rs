//! Test configuration helpers.
//!
//! Provides configurations for tests, centralizing magic values that would
//! otherwise be scattered across test modules.

use ramdisk_types::config::{LimitsConfig, RamdiskConfig, StorageConfig};

/// Maximum node size used by [`test_limits_config`].
pub const TEST_MAX_NODE_BYTES: usize = 256;

/// Returns limits small enough to hit from tests:
/// - `max_node_bytes`: 256
/// - `max_actions_per_transaction`: 16
#[must_use]
pub fn test_limits_config() -> LimitsConfig {
    LimitsConfig { max_node_bytes: TEST_MAX_NODE_BYTES, max_actions_per_transaction: 16 }
}

/// Returns a full configuration with test limits and no fsync on commit.
#[must_use]
pub fn test_ramdisk_config() -> RamdiskConfig {
    RamdiskConfig {
        limits: test_limits_config(),
        storage: StorageConfig { sync_on_commit: false, ..StorageConfig::default() },
    }
}
