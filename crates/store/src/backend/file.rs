//! File-based storage backend using atomic rename.
//!
//! A snapshot is written to `<path>.tmp`, optionally fsynced, and renamed over
//! `<path>`. Rename is atomic on POSIX filesystems, so readers and recovery
//! always see one complete snapshot.
//!
//! Each snapshot holds the whole database, so every commit rewrites it in full.
//!
//! A backend holds an exclusive OS lock on `<path>.lock` for its lifetime.
//! Every handle writes whole snapshots from its own in-memory copy, so a second
//! handle on the same file would silently discard the first one's commits.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use parking_lot::Mutex;

use super::StorageBackend;
use crate::error::{Error, Result};

/// File-based storage backend.
///
/// Writes are serialized via a unit `Mutex` guard so two commits never race
/// on the temporary file.
pub struct FileBackend {
    /// Snapshot path.
    path: PathBuf,
    /// Temporary sibling used while writing.
    tmp_path: PathBuf,
    /// Serializes snapshot replacement.
    write_lock: Mutex<()>,
    /// Holds the cross-process lock until drop.
    _lock_file: File,
}

impl FileBackend {
    /// Opens (or prepares) a snapshot file at `path`.
    ///
    /// The file itself is created on the first write. The lock is taken
    /// before anything else, then a leftover temporary file from an
    /// interrupted write is removed.
    ///
    /// # Errors
    ///
    /// - [`Error::Locked`] if another handle, in this process or another,
    ///   has the file open.
    /// - [`Error::Io`] if the parent directory does not exist or the stale
    ///   temporary file cannot be removed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let tmp_path = sibling(&path, ".tmp");

        if let Some(parent) = parent_dir(&path) {
            fs::metadata(parent)?;
        }
        let lock_file = acquire_lock(&path)?;

        match fs::remove_file(&tmp_path) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => return Err(e.into()),
        }

        Ok(Self { path, tmp_path, write_lock: Mutex::new(()), _lock_file: lock_file })
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_snapshot(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_snapshot(&self, snapshot: &[u8], durable: bool) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut file =
            OpenOptions::new().write(true).create(true).truncate(true).open(&self.tmp_path)?;
        file.write_all(snapshot)?;
        if durable {
            file.sync_all()?;
        }
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        if durable {
            sync_parent_dir(&self.path)?;
        }
        Ok(())
    }

    fn snapshot_size(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<path><suffix>` in the same directory.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Takes a non-blocking exclusive lock on `<path>.lock`.
fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = sibling(path, ".lock");
    let file =
        OpenOptions::new().read(true).write(true).create(true).truncate(false).open(&lock_path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(file),
        Err(e) if is_contended(&e) => Err(Error::Locked { path: path.to_path_buf() }),
        Err(e) => Err(e.into()),
    }
}

/// Some platforms report a held lock as EAGAIN/EWOULDBLOCK instead of `WouldBlock`.
fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// Persists the rename itself by syncing the containing directory.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Path::new("."));
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
