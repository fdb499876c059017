//! Key encoding for the state tables.
//!
//! Volume records are keyed by the packed volume name. Node records are keyed
//! by the volume name followed by the node id, both big-endian, so:
//! - all nodes of a volume form one contiguous key range (prefix scan)
//! - within a volume, key order equals node id order
//!
//! Node key format: {volume:8BE}{node_id:8BE}

use ramdisk_types::{Name, NodeId};

/// Length of an encoded node key.
pub const NODE_KEY_LEN: usize = 16;

/// Decoded node key components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKey {
    /// Volume containing the node.
    pub volume: Name,
    /// Node identifier.
    pub id: NodeId,
}

/// Encodes the key of a volume record.
pub fn volume_key(volume: Name) -> u64 {
    volume.value()
}

/// Encodes the key of a node record.
pub fn node_key(volume: Name, id: NodeId) -> Vec<u8> {
    let mut key = Vec::with_capacity(NODE_KEY_LEN);
    key.extend_from_slice(&volume.value().to_be_bytes());
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Creates a prefix for scanning all nodes of a volume.
pub fn volume_prefix(volume: Name) -> [u8; 8] {
    volume.value().to_be_bytes()
}

/// Decodes a node key into its components.
///
/// Returns None if the key is not exactly [`NODE_KEY_LEN`] bytes.
pub fn decode_node_key(key: &[u8]) -> Option<NodeKey> {
    if key.len() != NODE_KEY_LEN {
        return None;
    }
    let volume = u64::from_be_bytes(key[..8].try_into().ok()?);
    let id = u64::from_be_bytes(key[8..].try_into().ok()?);
    Some(NodeKey { volume: Name::from_raw(volume), id })
}
