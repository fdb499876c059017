//! Transaction state types.
//!
//! - `SnapshotId`: Identifier for a committed database state
//! - `TableData`: The ordered contents of one table
//! - `CommittedState`: The visible state (table images) at a snapshot

use std::{collections::BTreeMap, sync::Arc};

use crate::tables::TableId;

/// Ordered key/value contents of a single table.
pub type TableData = BTreeMap<Vec<u8>, Vec<u8>>;

/// Identifies a committed database state.
///
/// Incremented once per commit that changes at least one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnapshotId(pub u64);

impl SnapshotId {
    /// Create a new snapshot ID with the given value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Returns the ID of the snapshot following this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// The committed state visible to readers.
///
/// Table images are shared between snapshots. A write transaction clones a
/// table only when it first modifies it.
#[derive(Debug, Clone, Default)]
pub struct CommittedState {
    /// Contents of each table, indexed by [`TableId`].
    pub tables: [Arc<TableData>; TableId::COUNT],
    /// The snapshot ID for this committed state.
    pub snapshot_id: SnapshotId,
}

impl CommittedState {
    /// Returns the image of one table.
    pub fn table(&self, id: TableId) -> &TableData {
        &self.tables[id.index()]
    }

    /// Returns the number of entries in each table.
    pub fn entry_counts(&self) -> [usize; TableId::COUNT] {
        TableId::all().map(|id| self.table(id).len())
    }
}
