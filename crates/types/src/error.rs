//! Machine-readable error codes.
//!
//! Every error surfaced by the contract service maps to an [`ErrorCode`] with
//! a unique numeric identifier and a suggested remediation. Codes are
//! organized into ranges:
//!
//! | Range       | Domain         | Examples                                   |
//! |-------------|----------------|--------------------------------------------|
//! | 1000–1099   | Storage        | I/O, corruption, transaction lock          |
//! | 1100–1199   | Storage codec  | Record serialization                       |
//! | 2000–2099   | Identity       | Malformed name, missing authorization      |
//! | 2100–2199   | Claim          | Auction open, wrong bidder, suffix unowned |
//! | 3000–3099   | Volume         | Already claimed, not found, not owner      |
//! | 3100–3199   | Input          | Oversized node, oversized transaction      |
//!
//! None of these errors are retryable: every failure aborts the enclosing
//! operation with no effect, and repeating it unchanged fails the same way.

use core::fmt;

/// Machine-readable error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // --- Storage errors (1000–1199) ---
    /// Reading or writing the database file failed.
    StorageIo = 1000,
    /// The database file is corrupted or has an unknown format.
    StorageCorruption = 1001,
    /// The write transaction could not be started or committed.
    StorageTransaction = 1002,
    /// A stored record could not be encoded or decoded.
    StorageCodec = 1100,

    // --- Identity and claim errors (2000–2199) ---
    /// The volume name is malformed.
    InvalidIdentifier = 2000,
    /// The transaction was not authorized by the acting account.
    MissingAuthority = 2001,
    /// The name's auction is still open.
    AuctionOpen = 2100,
    /// The name's auction was won by another account.
    WrongBidder = 2101,
    /// The claimant does not control the name's suffix.
    SuffixUnowned = 2102,

    // --- Volume and input errors (3000–3199) ---
    /// A volume with this name already exists.
    NamespaceAlreadyClaimed = 3000,
    /// No volume with this name exists.
    NamespaceNotFound = 3001,
    /// The acting account does not own the volume (or it is frozen).
    NotOwner = 3002,
    /// An action argument failed validation.
    InvalidArgument = 3100,
}

impl ErrorCode {
    /// Returns the numeric code value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a numeric code to an `ErrorCode`, returning `None` for unknown values.
    #[must_use]
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1000 => Some(Self::StorageIo),
            1001 => Some(Self::StorageCorruption),
            1002 => Some(Self::StorageTransaction),
            1100 => Some(Self::StorageCodec),
            2000 => Some(Self::InvalidIdentifier),
            2001 => Some(Self::MissingAuthority),
            2100 => Some(Self::AuctionOpen),
            2101 => Some(Self::WrongBidder),
            2102 => Some(Self::SuffixUnowned),
            3000 => Some(Self::NamespaceAlreadyClaimed),
            3001 => Some(Self::NamespaceNotFound),
            3002 => Some(Self::NotOwner),
            3100 => Some(Self::InvalidArgument),
            _ => None,
        }
    }

    /// Returns true for substrate faults, as opposed to rejected preconditions.
    #[must_use]
    pub const fn is_storage_fault(self) -> bool {
        self.as_u16() < 2000
    }

    /// Suggested recovery action for this error code.
    #[must_use]
    pub const fn suggested_action(self) -> &'static str {
        match self {
            Self::StorageIo => "Check disk space, filesystem permissions, and the data directory.",
            Self::StorageCorruption => {
                "Restore the database file from a backup. The snapshot checksum did not match."
            },
            Self::StorageTransaction => "Another writer panicked; restart the process.",
            Self::StorageCodec => "Stored record is unreadable. Report with the database file.",
            Self::InvalidIdentifier => "Use 1-12 characters from [.12345a-z], not ending in '.'.",
            Self::MissingAuthority => "Sign the transaction with the acting account.",
            Self::AuctionOpen => "Wait for the name auction to close.",
            Self::WrongBidder => "Only the winning bidder may claim this name.",
            Self::SuffixUnowned => {
                "Claim as the suffix account, or choose an unregistered or 12-character name."
            },
            Self::NamespaceAlreadyClaimed => "Choose another name, or delete the existing volume.",
            Self::NamespaceNotFound => "Claim the volume first.",
            Self::NotOwner => "Act as the volume owner. Frozen volumes cannot be modified.",
            Self::InvalidArgument => "Reduce the payload to the configured limit.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}
