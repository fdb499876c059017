//! Scratch directories for database and fixture files.

// Helpers panic on setup failure; a broken temp dir fails the test anyway.
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Default database file name, matching `StorageConfig::default()`.
const DB_FILE_NAME: &str = "ramdisk.db";

/// A scratch directory removed on drop.
///
/// # Example
///
/// ```
/// use ramdisk_test_utils::TestDir;
///
/// let dir = TestDir::new();
/// let fixture = dir.write("registry.toml", "accounts = [\"alice\"]\n");
/// assert!(fixture.starts_with(dir.path()));
/// assert!(!dir.db_path().exists());
/// ```
pub struct TestDir {
    inner: TempDir,
}

impl TestDir {
    /// Creates an empty scratch directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: TempDir::new().expect("failed to create temp directory") }
    }

    /// Root of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Resolves `relative` inside the directory.
    #[must_use]
    pub fn join<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.inner.path().join(relative)
    }

    /// Where a database with the default file name lives. Not created.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.join(DB_FILE_NAME)
    }

    /// Writes `contents` to `relative` and returns the full path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write<P: AsRef<Path>, C: AsRef<[u8]>>(&self, relative: P, contents: C) -> PathBuf {
        let path = self.join(relative);
        std::fs::write(&path, contents).expect("failed to write fixture file");
        path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
