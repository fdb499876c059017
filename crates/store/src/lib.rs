//! ramdisk-store: the embedded transactional table store behind ramdisk
//! volumes.
//!
//! - **Fixed schema**: two tables known at compile time
//! - **Single writer**: one write transaction at a time, readers never block
//! - **Copy-on-write**: table images are shared until a writer modifies them
//! - **Checksummed snapshots**: every commit writes a full XXH3-64 verified
//!   snapshot through an atomic replace
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                Database API                  │
//! │        (open, read, write, stats)           │
//! └────────────────┬────────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────────┐
//! │             Transaction Layer                │
//! │  (ReadTxn: Arc snapshot, WriteTxn: COW)     │
//! └────────────────┬────────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────────┐
//! │              Snapshot Codec                  │
//! │     (header, table sections, checksum)      │
//! └────────────────┬────────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────────┐
//! │            Storage Backend                   │
//! │      (FileBackend / InMemoryBackend)        │
//! └─────────────────────────────────────────────┘
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod db;
pub mod error;
pub mod snapshot;
pub mod tables;
pub mod transaction;
pub mod types;

pub use backend::{FileBackend, InMemoryBackend, StorageBackend};
pub use db::{Database, DatabaseConfig, DatabaseStats, ReadTransaction, TableIterator, WriteTransaction};
pub use error::{Error, Result};
pub use transaction::SnapshotId;
pub use types::{Key, KeyType};
