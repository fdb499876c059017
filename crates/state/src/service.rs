//! The contract service.
//!
//! [`Ramdisk`] exposes one method per contract operation plus read-only
//! queries. Each mutating method runs in its own write transaction and either
//! commits in full or leaves storage untouched. [`Ramdisk::execute`] applies a
//! multi-action [`Transaction`] under the same guarantee.

use std::sync::Arc;

use ramdisk_store::{Database, StorageBackend, WriteTransaction};
use ramdisk_types::{
    Action, Name, Node, NodeId, Transaction, Volume, VolumeUsage, config::LimitsConfig,
    validation::validate_transaction,
};
use serde::Serialize;
use snafu::{IntoError, ResultExt};
use tracing::{debug, info, instrument, warn};

use crate::{
    authority::Authority,
    authorizer::ClaimBasis,
    error::{ActionFailedSnafu, Result, StorageSnafu, ValidationSnafu},
    node::NodeStore,
    registry::NameRegistry,
    volume::VolumeStore,
};

/// Result of one applied action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A volume was claimed.
    Claimed {
        /// Rule the claim was granted under.
        basis: ClaimBasis,
    },
    /// A volume's nodes were cleared.
    Reset {
        /// Nodes removed.
        removed: u64,
    },
    /// A volume was deleted.
    Deleted {
        /// Nodes removed along with the volume.
        removed: u64,
    },
    /// A volume was frozen.
    Frozen,
    /// A node was written.
    NodeSet {
        /// True if the node did not exist before.
        created: bool,
    },
    /// A node delete was applied.
    NodeDeleted {
        /// True if the node existed.
        existed: bool,
    },
    /// Nodes were removed by a range or contiguous delete.
    NodesDeleted {
        /// Nodes removed.
        removed: u64,
    },
}

/// Contract service over a database and a naming subsystem.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use ramdisk_state::{Authority, InMemoryRegistry, Ramdisk};
/// use ramdisk_store::Database;
///
/// let db = Arc::new(Database::open_in_memory()?);
/// let ramdisk = Ramdisk::builder().db(db).registry(InMemoryRegistry::new()).build();
///
/// let alice = "alice".parse()?;
/// let auth = Authority::new([alice]);
/// ramdisk.claim(&auth, alice, alice)?;
/// ramdisk.set_node(&auth, alice, alice, 1, b"hello")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(bon::Builder)]
pub struct Ramdisk<B: StorageBackend, R: NameRegistry> {
    /// Shared database handle.
    db: Arc<Database<B>>,
    /// Auction registry and account directory.
    registry: R,
    /// Admission limits.
    #[builder(default)]
    limits: LimitsConfig,
}

impl<B: StorageBackend, R: NameRegistry> Ramdisk<B, R> {
    /// Returns the database handle.
    pub fn db(&self) -> &Arc<Database<B>> {
        &self.db
    }

    /// Returns the naming subsystem.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the admission limits.
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Runs `f` in a write transaction, committing only if it succeeds.
    fn with_write<T>(&self, f: impl FnOnce(&mut WriteTransaction<'_, B>) -> Result<T>) -> Result<T> {
        let mut txn = self.db.write().context(StorageSnafu)?;
        let value = f(&mut txn)?;
        txn.commit().context(StorageSnafu)?;
        Ok(value)
    }

    // ========================================================================
    // Volume operations
    // ========================================================================

    /// Claims `volume` for `claimant`.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::claim`].
    #[instrument(skip(self, auth))]
    pub fn claim(&self, auth: &Authority, claimant: Name, volume: Name) -> Result<ClaimBasis> {
        let basis = self.with_write(|txn| {
            VolumeStore::claim(txn, &self.registry, auth, claimant, volume)
        })?;
        info!(%claimant, %volume, %basis, "Volume claimed");
        Ok(basis)
    }

    /// Removes every node of `volume`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn reset(&self, auth: &Authority, owner: Name, volume: Name) -> Result<u64> {
        let removed = self.with_write(|txn| VolumeStore::reset(txn, auth, owner, volume))?;
        info!(%volume, removed, "Volume reset");
        Ok(removed)
    }

    /// Deletes `volume` and its nodes. Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn delete(&self, auth: &Authority, owner: Name, volume: Name) -> Result<u64> {
        let removed = self.with_write(|txn| VolumeStore::delete(txn, auth, owner, volume))?;
        info!(%volume, removed, "Volume deleted");
        Ok(removed)
    }

    /// Freezes `volume`. There is no way back.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn freeze(&self, auth: &Authority, owner: Name, volume: Name) -> Result<()> {
        self.with_write(|txn| VolumeStore::freeze(txn, auth, owner, volume))?;
        info!(%volume, "Volume frozen");
        Ok(())
    }

    // ========================================================================
    // Node operations
    // ========================================================================

    /// Creates or overwrites node `id`. Returns true if it was created.
    ///
    /// # Errors
    ///
    /// See [`NodeStore::set`].
    #[instrument(skip(self, auth, data), fields(data_len = data.len()))]
    pub fn set_node(
        &self,
        auth: &Authority,
        owner: Name,
        volume: Name,
        id: NodeId,
        data: &[u8],
    ) -> Result<bool> {
        let created = self
            .with_write(|txn| NodeStore::set(txn, auth, &self.limits, owner, volume, id, data))?;
        debug!(%volume, id, created, "Node written");
        Ok(created)
    }

    /// Removes node `id` if present. Returns true if it existed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn delete_node(&self, auth: &Authority, owner: Name, volume: Name, id: NodeId) -> Result<bool> {
        let existed = self.with_write(|txn| NodeStore::delete(txn, auth, owner, volume, id))?;
        debug!(%volume, id, existed, "Node deleted");
        Ok(existed)
    }

    /// Removes nodes with ids in `[start, end]`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn delete_range(
        &self,
        auth: &Authority,
        owner: Name,
        volume: Name,
        start: NodeId,
        end: NodeId,
    ) -> Result<u64> {
        let removed =
            self.with_write(|txn| NodeStore::delete_range(txn, auth, owner, volume, start, end))?;
        info!(%volume, start, end, removed, "Node range deleted");
        Ok(removed)
    }

    /// Removes the contiguous run of nodes starting at `start`, at most
    /// `count`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    #[instrument(skip(self, auth))]
    pub fn delete_contiguous(
        &self,
        auth: &Authority,
        owner: Name,
        volume: Name,
        start: NodeId,
        count: u64,
    ) -> Result<u64> {
        let removed = self.with_write(|txn| {
            NodeStore::delete_contiguous(txn, auth, owner, volume, start, count)
        })?;
        info!(%volume, start, count, removed, "Contiguous nodes deleted");
        Ok(removed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns the volume record, if claimed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` or `Codec` errors from the read.
    pub fn volume(&self, volume: Name) -> Result<Option<Volume>> {
        let txn = self.db.read().context(StorageSnafu)?;
        VolumeStore::get(&txn, volume)
    }

    /// Returns a node, if present.
    ///
    /// # Errors
    ///
    /// Returns `Storage` or `Codec` errors from the read.
    pub fn node(&self, volume: Name, id: NodeId) -> Result<Option<Node>> {
        let txn = self.db.read().context(StorageSnafu)?;
        NodeStore::get(&txn, volume, id)
    }

    /// Lists up to `limit` nodes with ids greater than `start_after`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` or `Codec` errors from the read.
    pub fn list_nodes(
        &self,
        volume: Name,
        start_after: Option<NodeId>,
        limit: usize,
    ) -> Result<Vec<Node>> {
        let txn = self.db.read().context(StorageSnafu)?;
        NodeStore::list(&txn, volume, start_after, limit)
    }

    /// Returns node count and data size of a claimed volume.
    ///
    /// # Errors
    ///
    /// Returns `Storage` or `Codec` errors from the read.
    pub fn volume_usage(&self, volume: Name) -> Result<Option<VolumeUsage>> {
        let txn = self.db.read().context(StorageSnafu)?;
        if VolumeStore::get(&txn, volume)?.is_none() {
            return Ok(None);
        }
        Ok(Some(NodeStore::usage(&txn, volume)?))
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Applies every action of `tx` in order, atomically.
    ///
    /// Either all actions take effect or none do.
    ///
    /// # Errors
    ///
    /// - `Validation` if the transaction has too many actions.
    /// - `ActionFailed` wrapping the first failing action's error, with its
    ///   index.
    /// - `Storage` if the commit fails.
    #[instrument(skip_all, fields(actions = tx.actions.len()))]
    pub fn execute(&self, tx: &Transaction) -> Result<Vec<ActionOutcome>> {
        validate_transaction(tx, &self.limits).context(ValidationSnafu)?;
        let auth = Authority::new(tx.authorizations.iter().copied());

        let result = self.with_write(|txn| {
            let mut outcomes = Vec::with_capacity(tx.actions.len());
            for (index, action) in tx.actions.iter().enumerate() {
                let outcome = self.apply(txn, &auth, action).map_err(|source| {
                    ActionFailedSnafu { index, kind: action.kind() }.into_error(source)
                })?;
                outcomes.push(outcome);
            }
            Ok(outcomes)
        });

        match &result {
            Ok(outcomes) => info!(applied = outcomes.len(), "Transaction committed"),
            Err(e) => warn!(error = %e, code = %e.code(), "Transaction aborted"),
        }
        result
    }

    /// Applies one action inside an open write transaction.
    fn apply(
        &self,
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        action: &Action,
    ) -> Result<ActionOutcome> {
        let outcome = match action {
            Action::Claim { claimant, volume } => ActionOutcome::Claimed {
                basis: VolumeStore::claim(txn, &self.registry, auth, *claimant, *volume)?,
            },
            Action::Reset { owner, volume } => {
                ActionOutcome::Reset { removed: VolumeStore::reset(txn, auth, *owner, *volume)? }
            },
            Action::Delete { owner, volume } => {
                ActionOutcome::Deleted { removed: VolumeStore::delete(txn, auth, *owner, *volume)? }
            },
            Action::Freeze { owner, volume } => {
                VolumeStore::freeze(txn, auth, *owner, *volume)?;
                ActionOutcome::Frozen
            },
            Action::SetNode { owner, volume, id, data } => ActionOutcome::NodeSet {
                created: NodeStore::set(txn, auth, &self.limits, *owner, *volume, *id, data)?,
            },
            Action::DeleteNode { owner, volume, id } => ActionOutcome::NodeDeleted {
                existed: NodeStore::delete(txn, auth, *owner, *volume, *id)?,
            },
            Action::DeleteRange { owner, volume, start, end } => ActionOutcome::NodesDeleted {
                removed: NodeStore::delete_range(txn, auth, *owner, *volume, *start, *end)?,
            },
            Action::DeleteContiguous { owner, volume, start, count } => {
                ActionOutcome::NodesDeleted {
                    removed: NodeStore::delete_contiguous(
                        txn, auth, *owner, *volume, *start, *count,
                    )?,
                }
            },
        };
        Ok(outcome)
    }
}
