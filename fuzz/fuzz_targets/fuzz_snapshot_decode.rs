//! Fuzz target for snapshot decoding and node key parsing.
//!
//! Arbitrary bytes fed to the snapshot decoder must produce an error, never a
//! panic. Snapshots that do decode must re-encode to the same bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ramdisk_state::decode_node_key;
use ramdisk_store::snapshot::{decode_snapshot, encode_snapshot};

fuzz_target!(|data: &[u8]| {
    if let Ok(state) = decode_snapshot(data) {
        let re_encoded = encode_snapshot(&state);
        assert!(re_encoded.is_ok(), "encode failed after successful decode");
        assert_eq!(re_encoded.ok().as_deref(), Some(data), "snapshot roundtrip mismatch");
    }

    if let Some(key) = decode_node_key(data) {
        assert_eq!(data.len(), ramdisk_state::NODE_KEY_LEN);
        assert_eq!(ramdisk_state::node_key(key.volume, key.id), data);
    }
});
