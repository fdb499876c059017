//! Storage backend abstraction for the store engine.
//!
//! The backend trait abstracts where snapshots live, allowing both file-based
//! (production) and in-memory (testing) implementations.
//!
//! # Crash Safety: Whole-Snapshot Replacement
//!
//! Every commit writes a complete snapshot. The file backend writes it to a
//! temporary sibling, flushes it, and renames it over the previous snapshot.
//! A crash at any point leaves either the old or the new snapshot in place,
//! never a mix of the two.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::InMemoryBackend;

use crate::error::Result;

/// Storage backend trait for abstracting snapshot persistence.
pub trait StorageBackend: Send + Sync {
    /// Reads the most recently written snapshot.
    ///
    /// Returns `None` if no snapshot has ever been written.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the read fails.
    fn read_snapshot(&self) -> Result<Option<Vec<u8>>>;

    /// Atomically replaces the stored snapshot.
    ///
    /// When `durable` is set the snapshot must be on stable storage before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the write fails. The previous snapshot is left
    /// intact.
    fn write_snapshot(&self, snapshot: &[u8], durable: bool) -> Result<()>;

    /// Returns the size in bytes of the stored snapshot (0 if none).
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the size cannot be determined.
    fn snapshot_size(&self) -> Result<u64>;
}
