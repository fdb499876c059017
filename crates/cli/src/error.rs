//! CLI error type.

use std::{io, path::PathBuf};

use ramdisk_state::ContractError;
use ramdisk_types::{ErrorCode, config::ConfigError};
use snafu::{Location, Snafu};

/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the `ramdisk` binary.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    /// An input file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    ReadFile {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The data directory could not be created.
    #[snafu(display("Failed to create data directory {}: {source}", path.display()))]
    CreateDataDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The configuration file is invalid.
    #[snafu(display("Invalid configuration: {source}"))]
    Config {
        /// Parse or validation failure.
        source: ConfigError,
        #[snafu(implicit)]
        location: Location,
    },

    /// The registry fixture is invalid.
    #[snafu(display("Invalid registry fixture {}: {source}", path.display()))]
    Registry {
        /// Fixture path.
        path: PathBuf,
        /// TOML parse failure.
        source: toml::de::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// `--hex` node data is not valid hex.
    #[snafu(display("Invalid hex node data: {source}"))]
    InvalidHex {
        /// Decode failure.
        source: hex::FromHexError,
        #[snafu(implicit)]
        location: Location,
    },

    /// The database could not be opened.
    #[snafu(display("Failed to open database {}: {source}", path.display()))]
    Open {
        /// Database file path.
        path: PathBuf,
        /// Store failure.
        source: ramdisk_store::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// The contract rejected the operation.
    #[snafu(display("{source}"))]
    Contract {
        /// Contract failure.
        source: ContractError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Output could not be rendered.
    #[snafu(display("Failed to render output: {source}"))]
    Render {
        /// Serialization failure.
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl CliError {
    /// Returns the contract error code, for errors that have one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            CliError::Contract { source, .. } => Some(source.code()),
            CliError::Open { source, .. } if source.is_corruption() => {
                Some(ErrorCode::StorageCorruption)
            },
            CliError::Open { .. } => Some(ErrorCode::StorageIo),
            _ => None,
        }
    }
}
