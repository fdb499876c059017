//! Shared test utilities for ramdisk crates.
//!
//! - [`TestDir`] - Scratch directory for database files and fixtures
//! - [`CrashingBackend`] - Storage backend that fails commits on demand
//! - [`strategies`] - Proptest generators for names and node actions
//! - [`test_limits_config`] - Small admission limits for tests

#![deny(unsafe_code)]

mod test_dir;
pub use test_dir::TestDir;

mod crash_injector;
pub use crash_injector::{CrashInjector, CrashPoint, CrashingBackend};

mod config;
pub use config::{TEST_MAX_NODE_BYTES, test_limits_config, test_ramdisk_config};

pub mod strategies;
