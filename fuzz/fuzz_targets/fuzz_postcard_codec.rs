//! Fuzz target for postcard codec roundtrip.
//!
//! Tests that arbitrary bytes fed to `decode` for stored records and actions
//! never panic, and that successfully decoded values roundtrip correctly.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ramdisk_types::codec::{decode, encode};
use ramdisk_types::{Action, NameBid, Node, Transaction, Volume};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let selector = data[0] % 5;
    let payload = &data[1..];

    match selector {
        0 => try_roundtrip::<Volume>(payload),
        1 => try_roundtrip::<Node>(payload),
        2 => try_roundtrip::<Action>(payload),
        3 => try_roundtrip::<Transaction>(payload),
        _ => try_roundtrip::<NameBid>(payload),
    }
});

/// Attempt to decode arbitrary bytes as type T. If successful, re-encode
/// and verify the roundtrip produces the same value.
fn try_roundtrip<T>(data: &[u8])
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Ok(value) = decode::<T>(data) {
        let re_encoded = encode(&value);
        assert!(re_encoded.is_ok(), "encode failed after successful decode");

        let re_decoded = decode::<T>(&re_encoded.expect("already checked"));
        assert!(re_decoded.is_ok(), "re-decode failed after successful encode");
        assert_eq!(value, re_decoded.expect("already checked"), "roundtrip mismatch");
    }
}
