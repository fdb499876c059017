//! Volume lifecycle: claim, reset, delete, freeze.
//!
//! Every mutating operation other than `claim` goes through
//! [`VolumeStore::authorize_owner`], which authenticates the caller and checks
//! it against the stored owner. A frozen volume has no owner account, so it
//! fails that check for everyone.

use ramdisk_store::{ReadTransaction, StorageBackend, WriteTransaction, tables};
use ramdisk_types::{Name, Owner, Volume, decode, encode};
use snafu::{OptionExt, ResultExt, ensure};

use crate::{
    authority::Authority,
    authorizer::{ClaimBasis, NameClaimAuthorizer},
    error::{
        CodecSnafu, InvalidIdentifierSnafu, NamespaceAlreadyClaimedSnafu, NamespaceNotFoundSnafu,
        NotOwnerSnafu, Result, StorageSnafu,
    },
    keys::volume_key,
    node::NodeStore,
    registry::NameRegistry,
};

/// Volume record operations.
pub struct VolumeStore;

impl VolumeStore {
    /// Returns a volume record by name.
    ///
    /// # Errors
    ///
    /// Returns `ContractError::Storage` if the read fails.
    /// Returns `ContractError::Codec` if the stored record cannot be decoded.
    pub fn get<B: StorageBackend>(
        txn: &ReadTransaction<'_, B>,
        volume: Name,
    ) -> Result<Option<Volume>> {
        match txn.get::<tables::Volumes>(&volume_key(volume)).context(StorageSnafu)? {
            Some(data) => Ok(Some(decode(&data).context(CodecSnafu)?)),
            None => Ok(None),
        }
    }

    /// Returns a volume record as seen by a write transaction.
    pub(crate) fn find<B: StorageBackend>(
        txn: &WriteTransaction<'_, B>,
        volume: Name,
    ) -> Result<Option<Volume>> {
        match txn.get::<tables::Volumes>(&volume_key(volume)).context(StorageSnafu)? {
            Some(data) => Ok(Some(decode(&data).context(CodecSnafu)?)),
            None => Ok(None),
        }
    }

    fn put<B: StorageBackend>(txn: &mut WriteTransaction<'_, B>, record: &Volume) -> Result<()> {
        let encoded = encode(record).context(CodecSnafu)?;
        txn.insert::<tables::Volumes>(&volume_key(record.name), &encoded).context(StorageSnafu)?;
        Ok(())
    }

    /// Claims `volume` for `claimant`.
    ///
    /// Checks run in order: name validity, claimant authority, uniqueness,
    /// claim authorization. The claimant becomes owner and payer.
    ///
    /// # Errors
    ///
    /// - `InvalidIdentifier` if `volume` is not a valid name.
    /// - `MissingAuthority` if the claimant did not authorize the transaction.
    /// - `NamespaceAlreadyClaimed` if the volume exists.
    /// - `SuffixUnowned`, `AuctionOpen` or `WrongBidder` from
    ///   [`NameClaimAuthorizer::authorize`].
    pub fn claim<B: StorageBackend, R: NameRegistry + ?Sized>(
        txn: &mut WriteTransaction<'_, B>,
        registry: &R,
        auth: &Authority,
        claimant: Name,
        volume: Name,
    ) -> Result<ClaimBasis> {
        let volume = Name::try_from(volume.value()).context(InvalidIdentifierSnafu)?;
        auth.require_auth(claimant)?;
        ensure!(Self::find(txn, volume)?.is_none(), NamespaceAlreadyClaimedSnafu { volume });
        let basis = NameClaimAuthorizer::authorize(registry, claimant, volume)?;

        Self::put(txn, &Volume { name: volume, owner: Owner::Active(claimant), payer: claimant })?;
        Ok(basis)
    }

    /// Authenticates `owner` and checks that it owns `volume`.
    ///
    /// # Errors
    ///
    /// - `MissingAuthority` if `owner` did not authorize the transaction.
    /// - `NamespaceNotFound` if the volume does not exist.
    /// - `NotOwner` if the stored owner differs or the volume is frozen.
    pub fn authorize_owner<B: StorageBackend>(
        txn: &WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
    ) -> Result<Volume> {
        auth.require_auth(owner)?;
        let record = Self::find(txn, volume)?.context(NamespaceNotFoundSnafu { volume })?;
        ensure!(record.owner.is(owner), NotOwnerSnafu { volume, caller: owner });
        Ok(record)
    }

    /// Removes every node of the volume, keeping the volume record.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn reset<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
    ) -> Result<u64> {
        Self::authorize_owner(txn, auth, owner, volume)?;
        NodeStore::clear_volume(txn, volume)
    }

    /// Removes the volume record and all of its nodes.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn delete<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
    ) -> Result<u64> {
        Self::authorize_owner(txn, auth, owner, volume)?;
        let removed = NodeStore::clear_volume(txn, volume)?;
        txn.delete::<tables::Volumes>(&volume_key(volume)).context(StorageSnafu)?;
        Ok(removed)
    }

    /// Makes the volume permanently immutable.
    ///
    /// # Errors
    ///
    /// See [`VolumeStore::authorize_owner`].
    pub fn freeze<B: StorageBackend>(
        txn: &mut WriteTransaction<'_, B>,
        auth: &Authority,
        owner: Name,
        volume: Name,
    ) -> Result<()> {
        let record = Self::authorize_owner(txn, auth, owner, volume)?;
        Self::put(txn, &Volume { owner: Owner::Frozen, ..record })
    }
}
