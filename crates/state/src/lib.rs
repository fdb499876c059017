//! State management for ramdisk volumes.
//!
//! This crate sits between the table store (`ramdisk-store`) and callers such
//! as the CLI, providing:
//!
//! - Claim authorization against an injected naming subsystem
//! - Volume lifecycle (claim, reset, delete, freeze)
//! - Node upsert, deletion, and range/contiguous removal
//! - The [`Ramdisk`] contract service and atomic multi-action transactions

#![deny(unsafe_code)]

mod authority;
mod authorizer;
mod error;
mod keys;
mod node;
mod registry;
mod service;
mod volume;

pub use authority::Authority;
pub use authorizer::{ClaimBasis, NameClaimAuthorizer};
pub use error::{ContractError, Result};
pub use keys::{NODE_KEY_LEN, NodeKey, decode_node_key, node_key, volume_key, volume_prefix};
pub use node::NodeStore;
// Re-export ramdisk-store's tables for convenience
pub use ramdisk_store::tables;
pub use registry::{AccountDirectory, AuctionRegistry, InMemoryRegistry, NameRegistry};
pub use service::{ActionOutcome, Ramdisk};
pub use volume::VolumeStore;
