//! Database handle and transactions.
//!
//! # Write cost
//!
//! Every dirty commit re-encodes the whole database into one snapshot and
//! rewrites it through the backend. Commit I/O therefore grows with total
//! database size, not with the size of the change. This suits the small,
//! single-owner volume sets the store is meant for; bulk loads should batch
//! many writes into one transaction.
//!
//! ```no_run
//! use ramdisk_store::{Database, tables};
//!
//! let db = Database::open_in_memory()?;
//!
//! let mut txn = db.write()?;
//! txn.insert::<tables::Volumes>(&7, &b"record".to_vec())?;
//! txn.commit()?;
//!
//! let txn = db.read()?;
//! assert!(txn.contains::<tables::Volumes>(&7)?);
//! # Ok::<(), ramdisk_store::Error>(())
//! ```

use std::{
    collections::btree_map,
    ops::Bound,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use arc_swap::ArcSwap;

use crate::{
    backend::{FileBackend, InMemoryBackend, StorageBackend},
    error::{Error, Result},
    snapshot::{decode_snapshot, encode_snapshot},
    tables::{Table, TableId},
    transaction::{CommittedState, SnapshotId, TableData},
    types::Key,
};

/// Database configuration options.
#[derive(Debug, Clone, bon::Builder)]
pub struct DatabaseConfig {
    /// Whether to sync on every commit (default true for durability).
    #[builder(default = true)]
    pub sync_on_commit: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { sync_on_commit: true }
    }
}

/// The main database handle.
///
/// Generic over [`StorageBackend`]: use [`Database<FileBackend>`] for
/// production and [`Database<InMemoryBackend>`] for testing.
///
/// Thread-safe with interior mutability. Supports concurrent reads and
/// exclusive writes (single-writer model).
///
/// # Transaction Isolation (Copy-on-Write)
///
/// - Read transactions capture the committed state at start (no locks held)
/// - Write transactions clone a table image the first time they modify it
/// - An atomic pointer swap makes commits visible to new readers
pub struct Database<B: StorageBackend> {
    /// Storage backend (file or memory).
    backend: B,
    /// Current committed state (atomically swapped on commit).
    committed_state: ArcSwap<CommittedState>,
    /// Configuration.
    config: DatabaseConfig,
    /// Ensures only one write transaction at a time.
    write_lock: std::sync::Mutex<()>,
    /// Commits that wrote a snapshot since open.
    commits: AtomicU64,
    /// Size of the most recently written or loaded snapshot.
    snapshot_bytes: AtomicU64,
}

impl Database<FileBackend> {
    /// Opens the database at `path`, creating it on first commit if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or a corruption
    /// error if the snapshot fails verification.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, DatabaseConfig::default())
    }

    /// Opens the database at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`Database::open`].
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: DatabaseConfig) -> Result<Self> {
        Self::with_backend(FileBackend::open(path)?, config)
    }
}

impl Database<InMemoryBackend> {
    /// Creates an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Infallible for a fresh backend; the signature matches the file-backed
    /// constructors.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_backend(InMemoryBackend::new(), DatabaseConfig::default())
    }
}

impl<B: StorageBackend> Database<B> {
    /// Opens a database over an arbitrary backend, loading its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading the snapshot fails, or a corruption
    /// error if it fails verification.
    pub fn with_backend(backend: B, config: DatabaseConfig) -> Result<Self> {
        let (state, size) = match backend.read_snapshot()? {
            Some(bytes) => (decode_snapshot(&bytes)?, bytes.len() as u64),
            None => (CommittedState::default(), 0),
        };

        Ok(Self {
            backend,
            committed_state: ArcSwap::from_pointee(state),
            config,
            write_lock: std::sync::Mutex::new(()),
            commits: AtomicU64::new(0),
            snapshot_bytes: AtomicU64::new(size),
        })
    }

    /// Begin a read transaction over the current committed state.
    ///
    /// # Errors
    ///
    /// Currently infallible; reserved for backends with per-read resources.
    pub fn read(&self) -> Result<ReadTransaction<'_, B>> {
        Ok(ReadTransaction { _db: self, snapshot: self.committed_state.load_full() })
    }

    /// Begin a write transaction.
    ///
    /// Only one write transaction can be active at a time; this blocks until
    /// the previous one finishes. Read transactions run concurrently and are
    /// unaffected by uncommitted changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Poisoned`] if the write lock is poisoned.
    pub fn write(&self) -> Result<WriteTransaction<'_, B>> {
        let write_guard = self.write_lock.lock().map_err(|_| Error::Poisoned)?;
        let current = self.committed_state.load_full();

        Ok(WriteTransaction {
            db: self,
            base_snapshot: current.snapshot_id,
            tables: current.tables.clone(),
            dirty: [false; TableId::COUNT],
            _write_guard: write_guard,
        })
    }

    /// Returns database statistics.
    pub fn stats(&self) -> DatabaseStats {
        let state = self.committed_state.load();
        DatabaseStats {
            snapshot_id: state.snapshot_id,
            volume_entries: state.table(TableId::Volumes).len(),
            node_entries: state.table(TableId::Nodes).len(),
            commits: self.commits.load(Ordering::Relaxed),
            snapshot_bytes: self.snapshot_bytes.load(Ordering::Relaxed),
        }
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the configuration this database was opened with.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

/// Database statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Current committed snapshot.
    pub snapshot_id: SnapshotId,
    /// Entries in the volumes table.
    pub volume_entries: usize,
    /// Entries in the nodes table.
    pub node_entries: usize,
    /// Commits that wrote a snapshot since open.
    pub commits: u64,
    /// Size of the latest snapshot in bytes.
    pub snapshot_bytes: u64,
}

/// A read-only transaction.
///
/// Holds the committed state captured at creation. No locks are held, so it
/// runs fully concurrently with write transactions.
pub struct ReadTransaction<'db, B: StorageBackend> {
    _db: &'db Database<B>,
    snapshot: Arc<CommittedState>,
}

impl<B: StorageBackend> ReadTransaction<'_, B> {
    /// Returns a value by key from a table.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches the write transaction.
    pub fn get<T: Table>(&self, key: &T::KeyType) -> Result<Option<Vec<u8>>>
    where
        T::KeyType: Key,
    {
        Ok(self.snapshot.table(T::ID).get(&key.to_key_bytes()).cloned())
    }

    /// Checks if a key exists in a table.
    ///
    /// # Errors
    ///
    /// Currently infallible.
    pub fn contains<T: Table>(&self, key: &T::KeyType) -> Result<bool>
    where
        T::KeyType: Key,
    {
        Ok(self.snapshot.table(T::ID).contains_key(&key.to_key_bytes()))
    }

    /// Iterates over all entries in a table in key order.
    pub fn iter<T: Table>(&self) -> TableIterator<'_> {
        TableIterator::full(self.snapshot.table(T::ID))
    }

    /// Iterates over entries with `start <= key < end`.
    ///
    /// `None` leaves that side unbounded.
    pub fn range<T: Table>(
        &self,
        start: Option<&T::KeyType>,
        end: Option<&T::KeyType>,
    ) -> TableIterator<'_>
    where
        T::KeyType: Key,
    {
        TableIterator::bounded(self.snapshot.table(T::ID), start, end)
    }

    /// Number of entries in a table.
    pub fn len<T: Table>(&self) -> usize {
        self.snapshot.table(T::ID).len()
    }

    /// Returns true if a table has no entries.
    pub fn is_empty<T: Table>(&self) -> bool {
        self.snapshot.table(T::ID).is_empty()
    }

    /// Returns the snapshot this transaction reads from.
    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot.snapshot_id
    }
}

/// A write transaction.
///
/// Changes are buffered in private table images and become visible only on
/// [`commit`](Self::commit). Dropping the transaction without committing
/// discards them, leaving the database unchanged.
pub struct WriteTransaction<'db, B: StorageBackend> {
    db: &'db Database<B>,
    /// Snapshot this transaction started from.
    base_snapshot: SnapshotId,
    /// Table images; shared with the committed state until first modified.
    tables: [Arc<TableData>; TableId::COUNT],
    /// Tables modified by this transaction.
    dirty: [bool; TableId::COUNT],
    /// Guard to ensure only one write transaction at a time.
    _write_guard: std::sync::MutexGuard<'db, ()>,
}

impl<B: StorageBackend> WriteTransaction<'_, B> {
    fn table(&self, id: TableId) -> &TableData {
        &self.tables[id.index()]
    }

    fn table_mut(&mut self, id: TableId) -> &mut TableData {
        self.dirty[id.index()] = true;
        Arc::make_mut(&mut self.tables[id.index()])
    }

    /// Inserts or updates a key-value pair.
    ///
    /// # Errors
    ///
    /// Currently infallible; persistence errors surface at commit.
    pub fn insert<T: Table>(&mut self, key: &T::KeyType, value: &T::ValueType) -> Result<()>
    where
        T::KeyType: Key,
        T::ValueType: AsRef<[u8]>,
    {
        let key_bytes = key.to_key_bytes();
        self.table_mut(T::ID).insert(key_bytes, value.as_ref().to_vec());
        Ok(())
    }

    /// Deletes a key, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Currently infallible; persistence errors surface at commit.
    pub fn delete<T: Table>(&mut self, key: &T::KeyType) -> Result<bool>
    where
        T::KeyType: Key,
    {
        let key_bytes = key.to_key_bytes();
        if !self.table(T::ID).contains_key(&key_bytes) {
            return Ok(false);
        }
        Ok(self.table_mut(T::ID).remove(&key_bytes).is_some())
    }

    /// Returns a value by key, including uncommitted changes.
    ///
    /// # Errors
    ///
    /// Currently infallible.
    pub fn get<T: Table>(&self, key: &T::KeyType) -> Result<Option<Vec<u8>>>
    where
        T::KeyType: Key,
    {
        Ok(self.table(T::ID).get(&key.to_key_bytes()).cloned())
    }

    /// Checks if a key exists, including uncommitted changes.
    ///
    /// # Errors
    ///
    /// Currently infallible.
    pub fn contains<T: Table>(&self, key: &T::KeyType) -> Result<bool>
    where
        T::KeyType: Key,
    {
        Ok(self.table(T::ID).contains_key(&key.to_key_bytes()))
    }

    /// Iterates over all entries in a table in key order.
    pub fn iter<T: Table>(&self) -> TableIterator<'_> {
        TableIterator::full(self.table(T::ID))
    }

    /// Iterates over entries with `start <= key < end`.
    pub fn range<T: Table>(
        &self,
        start: Option<&T::KeyType>,
        end: Option<&T::KeyType>,
    ) -> TableIterator<'_>
    where
        T::KeyType: Key,
    {
        TableIterator::bounded(self.table(T::ID), start, end)
    }

    /// Returns true if any table has been modified.
    pub fn is_dirty(&self) -> bool {
        self.dirty.iter().any(|d| *d)
    }

    /// Commits the transaction.
    ///
    /// If nothing was modified the backend is not touched and the snapshot id
    /// does not advance. Otherwise the full snapshot, every table included, is
    /// written (and synced when configured) before the new state is published.
    /// If the write fails, the committed state is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing the snapshot fails.
    pub fn commit(self) -> Result<()> {
        if !self.is_dirty() {
            return Ok(());
        }

        let state = CommittedState { tables: self.tables, snapshot_id: self.base_snapshot.next() };
        let bytes = encode_snapshot(&state)?;
        self.db.backend.write_snapshot(&bytes, self.db.config.sync_on_commit)?;

        self.db.committed_state.store(Arc::new(state));
        self.db.commits.fetch_add(1, Ordering::Relaxed);
        self.db.snapshot_bytes.store(bytes.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Aborts the transaction, discarding all changes.
    pub fn abort(self) {
        drop(self);
    }
}

/// Iterator over `(key, value)` pairs of one table image, in key order.
pub struct TableIterator<'a> {
    inner: Option<btree_map::Range<'a, Vec<u8>, Vec<u8>>>,
}

impl<'a> TableIterator<'a> {
    fn full(table: &'a TableData) -> Self {
        Self { inner: Some(table.range::<[u8], _>(..)) }
    }

    fn bounded<K: Key>(table: &'a TableData, start: Option<&K>, end: Option<&K>) -> Self {
        let start = start.map(Key::to_key_bytes);
        let end = end.map(Key::to_key_bytes);
        if matches!((&start, &end), (Some(s), Some(e)) if s >= e) {
            return Self { inner: None };
        }
        let lower = start.as_deref().map_or(Bound::Unbounded, Bound::Included);
        let upper = end.as_deref().map_or(Bound::Unbounded, Bound::Excluded);
        Self { inner: Some(table.range::<[u8], _>((lower, upper))) }
    }
}

impl<'a> Iterator for TableIterator<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

impl DoubleEndedIterator for TableIterator<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next_back().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
