//! Name claim authorization.
//!
//! Decides whether an account may claim a volume name:
//!
//! | Name shape                     | Rule                                          |
//! |--------------------------------|-----------------------------------------------|
//! | 12 characters, no separator    | anyone                                        |
//! | contains a separator           | only the owner of the suffix                  |
//! | short, no separator, auctioned | only the winner, once the auction has closed  |
//! | short, no separator, no bid    | the name's own account, or anyone if unused   |

use std::fmt;

use ramdisk_types::Name;
use serde::Serialize;
use snafu::ensure;

use crate::{
    error::{AuctionOpenSnafu, Result, SuffixUnownedSnafu, WrongBidderSnafu},
    registry::NameRegistry,
};

/// The rule under which a claim was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimBasis {
    /// Full-length top-level name, open to anyone.
    Unrestricted,
    /// Sub-name claimed by the owner of its suffix.
    ParentOwner,
    /// Premium name claimed by the winner of its closed auction.
    AuctionWinner,
    /// Short name claimed by the account of the same name.
    OwnName,
    /// Short name with no auction and no existing account.
    Unregistered,
}

impl fmt::Display for ClaimBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClaimBasis::Unrestricted => "unrestricted",
            ClaimBasis::ParentOwner => "parent_owner",
            ClaimBasis::AuctionWinner => "auction_winner",
            ClaimBasis::OwnName => "own_name",
            ClaimBasis::Unregistered => "unregistered",
        })
    }
}

/// Claim authorization against the naming subsystem.
pub struct NameClaimAuthorizer;

impl NameClaimAuthorizer {
    /// Checks whether `claimant` may claim `volume`.
    ///
    /// Sub-names never consult the registry.
    ///
    /// # Errors
    ///
    /// - `SuffixUnowned` if the claimant does not own the sub-name's suffix,
    ///   or the unauctioned short name belongs to another existing account.
    /// - `AuctionOpen` if the short name's auction has not closed.
    /// - `WrongBidder` if the short name's auction was won by someone else.
    pub fn authorize<R: NameRegistry + ?Sized>(
        registry: &R,
        claimant: Name,
        volume: Name,
    ) -> Result<ClaimBasis> {
        let class = volume.classify();
        if !class.is_restricted() {
            return Ok(ClaimBasis::Unrestricted);
        }

        let suffix = class.suffix;
        if !class.is_top_level {
            ensure!(claimant == suffix, SuffixUnownedSnafu { suffix, claimant });
            return Ok(ClaimBasis::ParentOwner);
        }

        match registry.find(suffix) {
            Some(bid) => {
                ensure!(bid.is_closed(), AuctionOpenSnafu { name: suffix });
                ensure!(
                    bid.high_bidder == claimant,
                    WrongBidderSnafu { name: suffix, winner: bid.high_bidder, claimant }
                );
                Ok(ClaimBasis::AuctionWinner)
            },
            None if claimant == volume => Ok(ClaimBasis::OwnName),
            None => {
                ensure!(!registry.exists(volume), SuffixUnownedSnafu { suffix, claimant });
                Ok(ClaimBasis::Unregistered)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use ramdisk_types::ErrorCode;

    use super::*;
    use crate::registry::InMemoryRegistry;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn code(result: Result<ClaimBasis>) -> ErrorCode {
        result.unwrap_err().code()
    }

    #[test]
    fn test_full_length_top_level_is_unrestricted() {
        // A bid on the exact name is ignored: the name is not scarce.
        let registry =
            InMemoryRegistry::new().with_bid(name("abcdefghijkl"), name("alice"), 100);
        let basis =
            NameClaimAuthorizer::authorize(&registry, name("zed"), name("abcdefghijkl")).unwrap();
        assert_eq!(basis, ClaimBasis::Unrestricted);
    }

    #[test]
    fn test_sub_name_requires_suffix_owner() {
        let registry = InMemoryRegistry::new();
        let basis =
            NameClaimAuthorizer::authorize(&registry, name("parent"), name("sub.parent")).unwrap();
        assert_eq!(basis, ClaimBasis::ParentOwner);

        let err = NameClaimAuthorizer::authorize(&registry, name("other"), name("sub.parent"));
        assert_eq!(code(err), ErrorCode::SuffixUnowned);
    }

    #[test]
    fn test_full_length_sub_name_still_restricted() {
        let registry = InMemoryRegistry::new();
        let volume = name("abcdefgh.xyz");
        assert_eq!(volume.length(), 12);
        let err = NameClaimAuthorizer::authorize(&registry, name("alice"), volume);
        assert_eq!(code(err), ErrorCode::SuffixUnowned);
        let basis = NameClaimAuthorizer::authorize(&registry, name("xyz"), volume).unwrap();
        assert_eq!(basis, ClaimBasis::ParentOwner);
    }

    #[test]
    fn test_sub_name_ignores_registry() {
        let registry = InMemoryRegistry::new()
            .with_bid(name("parent"), name("other"), -1)
            .with_account(name("other"));
        let err = NameClaimAuthorizer::authorize(&registry, name("other"), name("a.parent"));
        assert_eq!(code(err), ErrorCode::SuffixUnowned);
    }

    #[test]
    fn test_closed_auction_only_winner() {
        let registry = InMemoryRegistry::new().with_bid(name("gold"), name("winner"), -10);
        let basis =
            NameClaimAuthorizer::authorize(&registry, name("winner"), name("gold")).unwrap();
        assert_eq!(basis, ClaimBasis::AuctionWinner);

        for loser in ["gold", "alice", "bob"] {
            let err = NameClaimAuthorizer::authorize(&registry, name(loser), name("gold"));
            assert_eq!(code(err), ErrorCode::WrongBidder, "claimant {loser}");
        }
    }

    #[test]
    fn test_open_auction_rejects_everyone() {
        let registry = InMemoryRegistry::new().with_bid(name("gold"), name("winner"), 0);
        for claimant in ["winner", "gold", "alice"] {
            let err = NameClaimAuthorizer::authorize(&registry, name(claimant), name("gold"));
            assert_eq!(code(err), ErrorCode::AuctionOpen, "claimant {claimant}");
        }
    }

    #[test]
    fn test_unauctioned_short_name() {
        let registry = InMemoryRegistry::new().with_account(name("taken"));

        let basis = NameClaimAuthorizer::authorize(&registry, name("taken"), name("taken")).unwrap();
        assert_eq!(basis, ClaimBasis::OwnName);

        let err = NameClaimAuthorizer::authorize(&registry, name("alice"), name("taken"));
        assert_eq!(code(err), ErrorCode::SuffixUnowned);

        let basis = NameClaimAuthorizer::authorize(&registry, name("alice"), name("free")).unwrap();
        assert_eq!(basis, ClaimBasis::Unregistered);
    }

    #[test]
    fn test_basis_display() {
        assert_eq!(ClaimBasis::AuctionWinner.to_string(), "auction_winner");
        assert_eq!(ClaimBasis::Unregistered.to_string(), "unregistered");
    }
}
