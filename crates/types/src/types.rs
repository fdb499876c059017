//! Core record and action definitions.
//!
//! - Volume and node records as persisted by the state layer
//! - Auction registry entries consumed (read-only) by claim authorization
//! - Actions and transactions accepted by the contract service

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::name::Name;

/// Caller-chosen node identifier, unique within a volume.
pub type NodeId = u64;

// ============================================================================
// Volume Records
// ============================================================================

/// Controller of a volume.
///
/// `Frozen` replaces the owner permanently. No account can authenticate as a
/// frozen owner, so every mutation of a frozen volume fails ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// The volume is controlled by this account.
    Active(Name),
    /// The volume is immutable.
    Frozen,
}

impl Owner {
    /// Returns the controlling account, if the volume is not frozen.
    pub fn account(&self) -> Option<Name> {
        match self {
            Owner::Active(name) => Some(*name),
            Owner::Frozen => None,
        }
    }

    /// Returns true when `account` controls the volume.
    pub fn is(&self, account: Name) -> bool {
        matches!(self, Owner::Active(name) if *name == account)
    }

    /// Returns true for frozen volumes.
    pub fn is_frozen(&self) -> bool {
        matches!(self, Owner::Frozen)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Active(name) => write!(f, "{name}"),
            Owner::Frozen => f.write_str("<frozen>"),
        }
    }
}

/// A claimed namespace. At most one exists per name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// The claimed name.
    pub name: Name,
    /// Current controller.
    pub owner: Owner,
    /// Account billed for the volume record. Never changes after the claim.
    pub payer: Name,
}

/// A data node within a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier within the volume.
    pub id: NodeId,
    /// Opaque node contents.
    pub data: Vec<u8>,
    /// Account billed for the node. Kept across overwrites.
    pub payer: Name,
}

/// Aggregate storage used by a volume's nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUsage {
    /// Number of stored nodes.
    pub node_count: u64,
    /// Sum of node data lengths in bytes.
    pub data_bytes: u64,
}

// ============================================================================
// Auction Registry
// ============================================================================

/// Premium-name auction entry, owned by the naming subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBid {
    /// Name under auction.
    pub name: Name,
    /// Current (or winning) high bidder.
    pub high_bidder: Name,
    /// High bid amount. Negative once the auction has closed.
    pub high_bid: i64,
}

impl NameBid {
    /// Returns true once the auction has closed and the winner is final.
    pub fn is_closed(&self) -> bool {
        self.high_bid < 0
    }
}

// ============================================================================
// Actions
// ============================================================================

/// A single mutating operation against a volume.
///
/// Every action names the account it acts as (`claimant` or `owner`). That
/// account must be among the transaction's authorizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Claims a new volume.
    Claim {
        /// Account claiming the volume; becomes its owner and payer.
        claimant: Name,
        /// Volume name.
        volume: Name,
    },
    /// Removes every node of a volume, keeping the volume.
    Reset {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Removes a volume and all of its nodes.
    Delete {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Makes a volume permanently immutable.
    Freeze {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Creates or overwrites a node.
    SetNode {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// Node identifier.
        id: NodeId,
        /// Node contents.
        data: Vec<u8>,
    },
    /// Removes a node if present.
    DeleteNode {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// Node identifier.
        id: NodeId,
    },
    /// Removes every node with an id in `[start, end]`.
    DeleteRange {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// First id of the range (inclusive).
        start: NodeId,
        /// Last id of the range (inclusive).
        end: NodeId,
    },
    /// Removes up to `count` nodes with consecutive ids starting at `start`,
    /// stopping at the first missing id.
    DeleteContiguous {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// First id to remove.
        start: NodeId,
        /// Maximum number of nodes to remove.
        count: u64,
    },
}

impl Action {
    /// Short action name for logs and error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Claim { .. } => "claim",
            Action::Reset { .. } => "reset",
            Action::Delete { .. } => "delete",
            Action::Freeze { .. } => "freeze",
            Action::SetNode { .. } => "set_node",
            Action::DeleteNode { .. } => "delete_node",
            Action::DeleteRange { .. } => "delete_range",
            Action::DeleteContiguous { .. } => "delete_contiguous",
        }
    }

    /// The volume the action targets.
    pub fn volume(&self) -> Name {
        match self {
            Action::Claim { volume, .. }
            | Action::Reset { volume, .. }
            | Action::Delete { volume, .. }
            | Action::Freeze { volume, .. }
            | Action::SetNode { volume, .. }
            | Action::DeleteNode { volume, .. }
            | Action::DeleteRange { volume, .. }
            | Action::DeleteContiguous { volume, .. } => *volume,
        }
    }

    /// The account the action acts as.
    pub fn actor(&self) -> Name {
        match self {
            Action::Claim { claimant, .. } => *claimant,
            Action::Reset { owner, .. }
            | Action::Delete { owner, .. }
            | Action::Freeze { owner, .. }
            | Action::SetNode { owner, .. }
            | Action::DeleteNode { owner, .. }
            | Action::DeleteRange { owner, .. }
            | Action::DeleteContiguous { owner, .. } => *owner,
        }
    }
}

/// A batch of actions executed atomically under a set of authorizations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Accounts that authorized this transaction.
    pub authorizations: Vec<Name>,
    /// Actions, applied in order.
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Creates a transaction authorized by `authorizations`.
    pub fn new(authorizations: impl IntoIterator<Item = Name>) -> Self {
        Self { authorizations: authorizations.into_iter().collect(), actions: Vec::new() }
    }

    /// Appends an action.
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}
