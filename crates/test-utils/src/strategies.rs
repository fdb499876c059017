//! Proptest strategies for ramdisk domain types.
//!
//! Reusable generators for property-based testing across crates.
//!
//! # Usage
//!
//! ```no_run
//! use ramdisk_test_utils::strategies;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(name in strategies::arb_name()) {
//!         prop_assert!(name.length() <= 12);
//!     }
//! }
//! ```

// Strategies only emit text that parses as a name.
#![allow(clippy::expect_used)]

use proptest::prelude::*;
use ramdisk_types::{Action, Name, NodeId};

/// Generates a top-level name of 1-12 characters.
pub fn arb_top_level_name() -> impl Strategy<Value = Name> {
    "[a-z1-5]{1,12}".prop_map(|s| s.parse().expect("valid top-level name"))
}

/// Generates a short top-level name of 1-11 characters.
pub fn arb_short_name() -> impl Strategy<Value = Name> {
    "[a-z1-5]{1,11}".prop_map(|s| s.parse().expect("valid short name"))
}

/// Generates a sub-name `{label}.{suffix}` of at most 12 characters.
pub fn arb_sub_name() -> impl Strategy<Value = Name> {
    ("[a-z1-5]{1,5}", "[a-z1-5]{1,6}")
        .prop_map(|(label, suffix)| format!("{label}.{suffix}").parse().expect("valid sub-name"))
}

/// Generates any valid name, top-level or not.
pub fn arb_name() -> impl Strategy<Value = Name> {
    prop_oneof![3 => arb_top_level_name(), 1 => arb_sub_name()]
}

/// Generates node ids from a small range so operations collide often.
pub fn arb_node_id() -> impl Strategy<Value = NodeId> {
    0u64..32
}

/// Generates node data of 0-63 bytes.
pub fn arb_node_data() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..64)
}

/// Generates a node action on `volume`, acting as `owner`.
///
/// Produces `set_node`, `delete_node`, `delete_range` and `delete_contiguous`
/// with ids drawn from [`arb_node_id`]; ranges may be inverted.
pub fn arb_node_op(owner: Name, volume: Name) -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (arb_node_id(), arb_node_data())
            .prop_map(move |(id, data)| Action::SetNode { owner, volume, id, data }),
        2 => arb_node_id().prop_map(move |id| Action::DeleteNode { owner, volume, id }),
        1 => (arb_node_id(), arb_node_id())
            .prop_map(move |(start, end)| Action::DeleteRange { owner, volume, start, end }),
        1 => (arb_node_id(), 0u64..8)
            .prop_map(move |(start, count)| Action::DeleteContiguous { owner, volume, start, count }),
    ]
}
