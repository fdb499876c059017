//! Error types for the table store.

use std::{io, path::PathBuf};

use snafu::Snafu;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// I/O error from the underlying storage backend.
    #[snafu(display("I/O error: {source}"))]
    Io {
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Snapshot is structurally invalid.
    #[snafu(display("Corrupted snapshot: {reason}"))]
    Corrupted {
        /// Description of what was corrupted.
        reason: String,
    },

    /// Snapshot checksum verification failed.
    #[snafu(display("Snapshot checksum mismatch: expected {expected:#018x}, computed {computed:#018x}"))]
    ChecksumMismatch {
        /// Checksum stored in the snapshot trailer.
        expected: u64,
        /// Checksum computed over the snapshot body.
        computed: u64,
    },

    /// Invalid magic number in snapshot header.
    #[snafu(display("Invalid snapshot magic number"))]
    InvalidMagic,

    /// Unsupported snapshot format version.
    #[snafu(display("Unsupported format version: {version}"))]
    UnsupportedVersion {
        /// The unsupported version number.
        version: u16,
    },

    /// Another handle holds the database file.
    #[snafu(display("Database {} is locked by another handle", path.display()))]
    Locked {
        /// The snapshot path.
        path: PathBuf,
    },

    /// Internal lock was poisoned (another thread panicked while holding it).
    #[snafu(display("Internal lock poisoned"))]
    Poisoned,
}

// Provide automatic conversion from io::Error to Error::Io for ergonomic ? usage
impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::Io { source }
    }
}

impl Error {
    /// Returns true when the error indicates damaged persisted data rather
    /// than a transient I/O or locking failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::Corrupted { .. }
                | Error::ChecksumMismatch { .. }
                | Error::InvalidMagic
                | Error::UnsupportedVersion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        let display = format!("{err}");
        assert!(display.starts_with("I/O error:"), "got: {display}");
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_error_display_corrupted() {
        let err = Error::Corrupted { reason: "truncated table".to_string() };
        assert_eq!(format!("{err}"), "Corrupted snapshot: truncated table");
        assert!(err.is_corruption());
    }

    #[test]
    fn test_error_display_checksum_mismatch() {
        let err = Error::ChecksumMismatch { expected: 1, computed: 2 };
        assert_eq!(
            format!("{err}"),
            "Snapshot checksum mismatch: expected 0x0000000000000001, computed 0x0000000000000002"
        );
        assert!(err.is_corruption());
    }

    #[test]
    fn test_error_display_version() {
        let err = Error::UnsupportedVersion { version: 9 };
        assert_eq!(format!("{err}"), "Unsupported format version: 9");
        assert_eq!(format!("{}", Error::InvalidMagic), "Invalid snapshot magic number");
        assert_eq!(format!("{}", Error::Poisoned), "Internal lock poisoned");
        assert!(!Error::Poisoned.is_corruption());
    }

    #[test]
    fn test_error_display_locked() {
        let err = Error::Locked { path: PathBuf::from("/data/ramdisk.db") };
        assert_eq!(format!("{err}"), "Database /data/ramdisk.db is locked by another handle");
        assert!(!err.is_corruption());
    }
}
