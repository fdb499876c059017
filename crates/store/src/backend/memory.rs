//! In-memory storage backend for testing.

use std::{
    io,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::RwLock;

use super::StorageBackend;
use crate::error::{Error, Result};

/// In-memory storage backend for testing.
///
/// All data is stored in memory and lost when the backend is dropped.
/// Write failures can be injected to exercise commit error paths.
#[derive(Default)]
pub struct InMemoryBackend {
    /// The last written snapshot.
    snapshot: RwLock<Option<Vec<u8>>>,
    /// Number of successful snapshot writes.
    writes: AtomicU64,
    /// When set, every write fails with an I/O error.
    fail_writes: AtomicBool,
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend preloaded with snapshot bytes.
    pub fn with_snapshot(snapshot: Vec<u8>) -> Self {
        Self { snapshot: RwLock::new(Some(snapshot)), ..Self::default() }
    }

    /// Number of snapshots written since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Makes subsequent writes fail (for testing).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_snapshot(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot.read().clone())
    }

    fn write_snapshot(&self, snapshot: &[u8], _durable: bool) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(Error::Io { source: io::Error::other("injected write failure") });
        }
        *self.snapshot.write() = Some(snapshot.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn snapshot_size(&self) -> Result<u64> {
        Ok(self.snapshot.read().as_ref().map_or(0, |s| s.len() as u64))
    }
}
