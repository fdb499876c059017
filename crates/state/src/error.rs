//! Errors raised by contract operations.
//!
//! Every error aborts the enclosing operation with no effect. Callers branch
//! on [`ContractError::code`] rather than on display text.

use ramdisk_types::{CodecError, ErrorCode, Name, NameError, ValidationError};
use snafu::Snafu;

/// Errors returned by volume, node, and transaction operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContractError {
    /// The volume name is malformed.
    #[snafu(display("Invalid identifier: {source}"))]
    InvalidIdentifier {
        source: NameError,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// The transaction was not authorized by `account`.
    #[snafu(display("Missing authority of {account}"))]
    MissingAuthority {
        account: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// A volume with this name already exists.
    #[snafu(display("Volume {volume} is already claimed"))]
    NamespaceAlreadyClaimed {
        volume: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// The auction for the name has not closed yet.
    #[snafu(display("Suffix auction for {name} is still open"))]
    AuctionOpen {
        name: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// The auction for the name was won by another account.
    #[snafu(display("Suffix {name} was won by {winner}, not {claimant}"))]
    WrongBidder {
        name: Name,
        winner: Name,
        claimant: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// The claimant does not control the name's suffix.
    #[snafu(display("Suffix {suffix} is not owned by {claimant}"))]
    SuffixUnowned {
        suffix: Name,
        claimant: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// No volume with this name exists.
    #[snafu(display("Volume {volume} not found"))]
    NamespaceNotFound {
        volume: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// The caller is not the volume's owner, or the volume is frozen.
    #[snafu(display("{caller} does not own volume {volume}"))]
    NotOwner {
        volume: Name,
        caller: Name,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// An action argument failed admission limits.
    #[snafu(display("Invalid argument: {source}"))]
    Validation {
        source: ValidationError,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// Underlying storage operation failed.
    #[snafu(display("Storage error: {source}"))]
    Storage {
        source: ramdisk_store::Error,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// Serialization or deserialization of a stored record failed.
    #[snafu(display("Codec error: {source}"))]
    Codec {
        source: CodecError,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    /// An action of a multi-action transaction failed; nothing was applied.
    #[snafu(display("Action {index} ({kind}) failed: {source}"))]
    ActionFailed {
        index: usize,
        kind: &'static str,
        #[snafu(source(from(ContractError, Box::new)))]
        source: Box<ContractError>,
    },
}

/// Result type for contract operations.
pub type Result<T> = std::result::Result<T, ContractError>;

impl ContractError {
    /// Returns the machine-readable error code.
    ///
    /// For [`ContractError::ActionFailed`] this is the code of the action's
    /// own error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ContractError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            ContractError::MissingAuthority { .. } => ErrorCode::MissingAuthority,
            ContractError::NamespaceAlreadyClaimed { .. } => ErrorCode::NamespaceAlreadyClaimed,
            ContractError::AuctionOpen { .. } => ErrorCode::AuctionOpen,
            ContractError::WrongBidder { .. } => ErrorCode::WrongBidder,
            ContractError::SuffixUnowned { .. } => ErrorCode::SuffixUnowned,
            ContractError::NamespaceNotFound { .. } => ErrorCode::NamespaceNotFound,
            ContractError::NotOwner { .. } => ErrorCode::NotOwner,
            ContractError::Validation { .. } => ErrorCode::InvalidArgument,
            ContractError::Storage { source, .. } => match source {
                ramdisk_store::Error::Poisoned => ErrorCode::StorageTransaction,
                e if e.is_corruption() => ErrorCode::StorageCorruption,
                _ => ErrorCode::StorageIo,
            },
            ContractError::Codec { .. } => ErrorCode::StorageCodec,
            ContractError::ActionFailed { source, .. } => source.code(),
        }
    }

    /// Returns the error that actually stopped the operation, looking
    /// through [`ContractError::ActionFailed`].
    pub fn root(&self) -> &ContractError {
        match self {
            ContractError::ActionFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Index of the failing action, for transaction errors.
    pub fn action_index(&self) -> Option<usize> {
        match self {
            ContractError::ActionFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use snafu::{IntoError, ResultExt};

    use super::*;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    #[test]
    fn test_codes() {
        let err = NotOwnerSnafu { volume: name("files"), caller: name("bob") }.build();
        assert_eq!(err.code(), ErrorCode::NotOwner);
        assert_eq!(err.to_string(), "bob does not own volume files");

        let err = "Bad".parse::<Name>().context(InvalidIdentifierSnafu).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidIdentifier);
    }

    #[test]
    fn test_storage_codes() {
        let err = StorageSnafu.into_error(ramdisk_store::Error::InvalidMagic);
        assert_eq!(err.code(), ErrorCode::StorageCorruption);
        let err = StorageSnafu.into_error(ramdisk_store::Error::Poisoned);
        assert_eq!(err.code(), ErrorCode::StorageTransaction);
        let err = StorageSnafu.into_error(ramdisk_store::Error::Io {
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.code(), ErrorCode::StorageIo);
        assert!(err.code().is_storage_fault());
    }

    #[test]
    fn test_action_failed_delegates_to_source() {
        let inner = NamespaceNotFoundSnafu { volume: name("files") }.build();
        let err = ActionFailedSnafu { index: 2usize, kind: "reset" }.into_error(inner);
        assert_eq!(err.code(), ErrorCode::NamespaceNotFound);
        assert_eq!(err.action_index(), Some(2));
        assert!(matches!(err.root(), ContractError::NamespaceNotFound { .. }));
        assert_eq!(err.to_string(), "Action 2 (reset) failed: Volume files not found");
    }
}
