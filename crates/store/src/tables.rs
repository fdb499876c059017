//! Fixed table definitions for the store engine.
//!
//! The store has exactly two tables, both known at compile time.

use crate::types::KeyType;

/// Compile-time table identifier. All tables are statically defined; dynamic
/// creation is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableId {
    /// Volume records: volume name value -> postcard `Volume`
    Volumes = 0,

    /// Node records: key = {volume:8BE}{node_id:8BE} -> postcard `Node`
    Nodes = 1,
}

impl TableId {
    /// Total number of tables.
    pub const COUNT: usize = 2;

    /// Returns all table IDs in order.
    pub fn all() -> [TableId; Self::COUNT] {
        [TableId::Volumes, TableId::Nodes]
    }

    /// Converts from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TableId::Volumes),
            1 => Some(TableId::Nodes),
            _ => None,
        }
    }

    /// Returns the table name for debugging.
    pub fn name(self) -> &'static str {
        match self {
            TableId::Volumes => "volumes",
            TableId::Nodes => "nodes",
        }
    }

    /// Returns the key type for this table.
    pub fn key_type(self) -> KeyType {
        match self {
            TableId::Volumes => KeyType::U64,
            TableId::Nodes => KeyType::Bytes,
        }
    }

    /// Index of this table in per-table arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Type-Safe Table Trait
// ============================================================================

/// Trait for compile-time type-safe table access.
///
/// Each table struct implements this trait with its specific key and value
/// types. Serialization of keys is handled by the `Key` trait in types.rs.
pub trait Table {
    /// The table identifier.
    const ID: TableId;

    /// Key type for this table.
    type KeyType;

    /// Value type for this table.
    type ValueType;
}

/// Volumes table: one record per claimed volume.
pub struct Volumes;
impl Table for Volumes {
    const ID: TableId = TableId::Volumes;
    type KeyType = u64;
    type ValueType = Vec<u8>;
}

/// Nodes table: node records of every volume, grouped by volume prefix.
pub struct Nodes;
impl Table for Nodes {
    const ID: TableId = TableId::Nodes;
    type KeyType = Vec<u8>;
    type ValueType = Vec<u8>;
}
