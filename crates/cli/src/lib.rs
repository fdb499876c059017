//! Command-line front end for a local ramdisk volume database.
//!
//! The `ramdisk` binary opens (or creates) a file-backed database in a data
//! directory, applies one contract operation per invocation, and prints the
//! result as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Claim a volume and write a node
//! ramdisk --data /tmp/rd claim alice alice
//! ramdisk --data /tmp/rd set-node alice alice 1 --hex 68656c6c6f
//!
//! # Environment variables stand in for global flags
//! RAMDISK_DATA=/tmp/rd ramdisk list-nodes alice
//!
//! # Act on behalf of another account
//! ramdisk --auth bob --registry names.toml claim bob abc
//! ```

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, ConfigAction, LogFormat};
pub use commands::{Output, run};
pub use error::{CliError, Result};
