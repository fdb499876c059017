//! Read-only views of the ledger's naming subsystem.
//!
//! Claim authorization consults two external capabilities: the premium-name
//! auction registry and the account directory. Both are injected so the
//! contract logic never depends on how the host ledger stores them.

use std::collections::{BTreeMap, BTreeSet};

use ramdisk_types::{Name, NameBid};
use serde::{Deserialize, Serialize};

/// Lookup of premium-name auction entries.
pub trait AuctionRegistry {
    /// Returns the auction entry for `name`, if one exists.
    fn find(&self, name: Name) -> Option<NameBid>;
}

/// Lookup of existing ledger accounts.
pub trait AccountDirectory {
    /// Returns true if an account named `account` exists.
    fn exists(&self, account: Name) -> bool;
}

/// Everything claim authorization needs from the naming subsystem.
pub trait NameRegistry: AuctionRegistry + AccountDirectory {}

impl<T: AuctionRegistry + AccountDirectory + ?Sized> NameRegistry for T {}

/// In-memory naming subsystem.
///
/// Used by tests and by the CLI, which loads it from a TOML fixture:
///
/// ```toml
/// accounts = ["alice", "bob"]
///
/// [[bids]]
/// name = "abc"
/// high_bidder = "alice"
/// high_bid = -1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryFixture", into = "RegistryFixture")]
pub struct InMemoryRegistry {
    bids: BTreeMap<Name, NameBid>,
    accounts: BTreeSet<Name>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an auction entry.
    #[must_use]
    pub fn with_bid(mut self, name: Name, high_bidder: Name, high_bid: i64) -> Self {
        self.bids.insert(name, NameBid { name, high_bidder, high_bid });
        self
    }

    /// Registers an existing account.
    #[must_use]
    pub fn with_account(mut self, account: Name) -> Self {
        self.accounts.insert(account);
        self
    }

    /// Number of auction entries.
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl AuctionRegistry for InMemoryRegistry {
    fn find(&self, name: Name) -> Option<NameBid> {
        self.bids.get(&name).copied()
    }
}

impl AccountDirectory for InMemoryRegistry {
    fn exists(&self, account: Name) -> bool {
        self.accounts.contains(&account)
    }
}

/// On-disk shape of an [`InMemoryRegistry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryFixture {
    #[serde(default)]
    accounts: Vec<Name>,
    #[serde(default)]
    bids: Vec<NameBid>,
}

impl From<RegistryFixture> for InMemoryRegistry {
    fn from(fixture: RegistryFixture) -> Self {
        Self {
            bids: fixture.bids.into_iter().map(|bid| (bid.name, bid)).collect(),
            accounts: fixture.accounts.into_iter().collect(),
        }
    }
}

impl From<InMemoryRegistry> for RegistryFixture {
    fn from(registry: InMemoryRegistry) -> Self {
        Self {
            accounts: registry.accounts.into_iter().collect(),
            bids: registry.bids.into_values().collect(),
        }
    }
}
