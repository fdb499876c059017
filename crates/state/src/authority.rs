//! Transaction authorizations.

use std::collections::BTreeSet;

use ramdisk_types::Name;
use snafu::ensure;

use crate::error::{MissingAuthoritySnafu, Result};

/// The set of accounts that authorized the executing transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authority {
    accounts: BTreeSet<Name>,
}

impl Authority {
    /// Creates an authority set from the given accounts.
    pub fn new(accounts: impl IntoIterator<Item = Name>) -> Self {
        Self { accounts: accounts.into_iter().collect() }
    }

    /// Returns true if `account` authorized the transaction.
    pub fn has_auth(&self, account: Name) -> bool {
        self.accounts.contains(&account)
    }

    /// Fails unless `account` authorized the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingAuthority`](crate::ContractError::MissingAuthority)
    /// if `account` is not in the set.
    pub fn require_auth(&self, account: Name) -> Result<()> {
        ensure!(self.has_auth(account), MissingAuthoritySnafu { account });
        Ok(())
    }

    /// Iterates over the authorizing accounts in name order.
    pub fn accounts(&self) -> impl Iterator<Item = Name> + '_ {
        self.accounts.iter().copied()
    }
}

impl FromIterator<Name> for Authority {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        Self::new(iter)
    }
}
