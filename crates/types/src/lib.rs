//! Core types, errors, and configuration for ramdisk volumes.
//!
//! This crate provides the foundational types shared by the store, the state
//! layer, and the CLI:
//! - Account/volume names and their structural classification
//! - Volume, node, and auction-registry records
//! - Actions and transactions
//! - Error codes, input validation, and configuration
//! - Postcard codec for stored records

#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod name;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use codec::{CodecError, decode, encode};
pub use error::ErrorCode;
pub use name::{MAX_NAME_LEN, Name, NameClass, NameError};
pub use types::*;
pub use validation::ValidationError;
