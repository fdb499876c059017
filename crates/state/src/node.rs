//! Node storage operations.
//!
//! Mutating operations authorize the caller against the volume first, through
//! [`VolumeStore::authorize_owner`]. Reads need no authorization.

use ramdisk_store::{ReadTransaction, StorageBackend, WriteTransaction, tables};
use ramdisk_types::{
    Name, Node, NodeId, VolumeUsage, config::LimitsConfig, decode, encode,
    validation::validate_node_data,
};
use snafu::ResultExt;

use crate::{
    authority::Authority,
    error::{CodecSnafu, Result, StorageSnafu, ValidationSnafu},
    keys::{decode_node_key, node_key, volume_prefix},
    volume::VolumeStore,
};

/// Node record operations.
pub struct NodeStore;

impl NodeStore {
    /// Returns a node by id.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Storage` if the read fails.
    /// Returns `ContractError::Codec` if the stored node cannot be decoded.
    pub fn get<B: StorageBackend>(
        txn: &ReadTransaction<'_, B>,
        volume: Name,
        id: NodeId,
    ) -> Result<Option<Node>> {
        match txn.get::<tables::Nodes>(&node_key(volume, id)).context(StorageSnafu)? {
            Some(data) => Ok(Some(decode(&data).context(CodecSnafu)?)),
            None => Ok(None),
        }
    }

    /// Lists nodes of a volume in ascending id order.
    ///
    /// Starts after `start_after` when given and returns at most `limit`
    /// nodes.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Codec` if a stored node cannot be decoded.
    pub fn list<B: StorageBackend>(
        txn: &ReadTransaction<'_, B>,
        volume: Name,
        start_after: Option<NodeId>,
        limit: usize,
    ) -> Result<Vec<Node>> {
        let start = match start_after {
            Some(u64::MAX) => return Ok(Vec::new()),
            Some(id) => node_key(volume, id + 1),
            None => node_key(volume, 0),
        };
        let prefix = volume_prefix(volume);

        let mut nodes = Vec::new();
        for (key, value) in txn.range::<tables::Nodes>(Some(&start), None) {
            if !key.starts_with(&prefix) || nodes.len() >= limit {
                break;
            }
            nodes.push(decode(value).context(CodecSnafu)?);
        }
        Ok(nodes)
    }

    /// Counts the nodes of a volume and sums their data sizes.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Codec` if a stored node cannot be decoded.
    pub fn usage<B: StorageBackend>(
        txn: &ReadTransaction<'_, B>,
        volume: Name,
    ) -> Result<VolumeUsage> {
        let start = node_key(volume, 0);
        let prefix = volume_prefix(volume);

        let mut usage = VolumeUsage::default();
        for (key, value) in txn.range::<tables::Nodes>(Some(&start), None) {
            if !key.starts_with(&prefix) {
                break;
            }
            let node: Node = decode(value).context(CodecSnafu)?;
            usage.node_count += 1;
            usage.data_bytes += node.data.len() as u64;
        }
        Ok(usage)
    }

    /// Creates or overwrites a node.
    ///
    /// A new node is billed to `owner`; an overwritten node keeps its payer.
    /// Returns true if the node was created.
    ///
    /// # Errors
    ///
    /// - `Validation` if `data` exceeds the configured limit. Checked before
    ///   anything else.
    /// - Any error of [`VolumeStore::authorize_owner`].
    pub fn set<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        limits: &LimitsConfig,
        owner: Name,
        volume: Name,
        id: NodeId,
        data: &[u8],
    ) -> Result<bool> {
        validate_node_data(data, limits).context(ValidationSnafu)?;
        VolumeStore::authorize_owner(txn, auth, owner, volume)?;

        let key = node_key(volume, id);
        let existing: Option<Node> = match txn.get::<tables::Nodes>(&key).context(StorageSnafu)? {
            Some(bytes) => Some(decode(&bytes).context(CodecSnafu)?),
            None => None,
        };
        let created = existing.is_none();
        let payer = existing.map_or(owner, |node| node.payer);

        let encoded = encode(&Node { id, data: data.to_vec(), payer }).context(CodecSnafu)?;
        txn.insert::<tables::Nodes>(&key, &encoded).context(StorageSnafu)?;
        Ok(created)
    }

    /// Removes a node if present. Returns true if it existed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn delete<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
        id: NodeId,
    ) -> Result<bool> {
        VolumeStore::authorize_owner(txn, auth, owner, volume)?;
        txn.delete::<tables::Nodes>(&node_key(volume, id)).context(StorageSnafu)
    }

    /// Removes every node with `start <= id <= end`.
    ///
    /// Missing ids are skipped. `start > end` removes nothing. Returns the
    /// number of nodes removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn delete_range<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
        start: NodeId,
        end: NodeId,
    ) -> Result<u64> {
        VolumeStore::authorize_owner(txn, auth, owner, volume)?;
        if start > end {
            return Ok(0);
        }

        let start_key = node_key(volume, start);
        let end_key = node_key(volume, end);
        let doomed: Vec<Vec<u8>> = txn
            .range::<tables::Nodes>(Some(&start_key), None)
            .map(|(key, _)| key)
            .take_while(|key| *key <= end_key.as_slice())
            .map(<[u8]>::to_vec)
            .collect();

        Self::remove_keys(txn, doomed)
    }

    /// Removes nodes `start`, `start + 1`, ... while each id is present,
    /// stopping at the first gap or after `count` removals.
    ///
    /// A gap ends the run silently, so fewer than `count` nodes may be
    /// removed. Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn delete_contiguous<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
        start: NodeId,
        count: u64,
    ) -> Result<u64> {
        VolumeStore::authorize_owner(txn, auth, owner, volume)?;

        let start_key = node_key(volume, start);
        let mut doomed = Vec::new();
        let mut expected = Some(start);
        for (key, _) in txn.range::<tables::Nodes>(Some(&start_key), None) {
            let Some(want) = expected else { break };
            if doomed.len() as u64 >= count {
                break;
            }
            match decode_node_key(key) {
                Some(found) if found.volume == volume && found.id == want => {
                    doomed.push(key.to_vec());
                    expected = want.checked_add(1);
                },
                _ => break,
            }
        }

        Self::remove_keys(txn, doomed)
    }

    /// Removes every node of a volume without authorization.
    ///
    /// Callers must have authorized the owner already.
    pub(crate) fn clear_volume<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        volume: Name,
    ) -> Result<u64> {
        let start = node_key(volume, 0);
        let prefix = volume_prefix(volume);
        let doomed: Vec<Vec<u8>> = txn
            .range::<tables::Nodes>(Some(&start), None)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&prefix))
            .map(<[u8]>::to_vec)
            .collect();

        Self::remove_keys(txn, doomed)
    }

    fn remove_keys<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        keys: Vec<Vec<u8>>,
    ) -> Result<u64> {
        let mut removed = 0;
        for key in keys {
            if txn.delete::<tables::Nodes>(&key).context(StorageSnafu)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
