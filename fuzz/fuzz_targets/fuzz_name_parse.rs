//! Fuzz target for name parsing and classification.
//!
//! Tests that parsing arbitrary text never panics, that parsed names render
//! back to the same text, and that packed values accepted by `TryFrom<u64>`
//! classify without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ramdisk_types::{MAX_NAME_LEN, Name};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(name) = text.parse::<Name>() {
            assert_eq!(name.to_string(), text, "render mismatch");
            assert!(name.length() <= MAX_NAME_LEN);
            let class = name.classify();
            assert_eq!(class.is_top_level, class.suffix == name);
        }
    }

    if data.len() >= 8 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&data[..8]);
        if let Ok(name) = Name::try_from(u64::from_le_bytes(raw)) {
            let text = name.to_string();
            assert_eq!(text.parse::<Name>().ok(), Some(name), "packed value did not reparse");
        }
    }
});
