//! Key encoding for the store engine.
//!
//! The store supports two key types:
//! - `u64`: 8-byte fixed-width integers (big-endian for lexicographic ordering)
//! - `Vec<u8>`: Arbitrary bytes, stored as-is
//!
//! Values are always raw bytes.

use byteorder::{BigEndian, ByteOrder};

/// Key type discriminant for compile-time table definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Unsigned 64-bit integer (big-endian for lexicographic ordering).
    U64,
    /// Arbitrary bytes.
    Bytes,
}

/// Trait for types that can be used as keys in store tables.
///
/// Encoded keys compare lexicographically in the same order as the decoded
/// values.
pub trait Key: Sized {
    /// The key type discriminant.
    const KEY_TYPE: KeyType;

    /// Encode the key into a byte buffer.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decode a key from a byte slice.
    fn decode(buf: &[u8]) -> Option<Self>;

    /// Returns the encoded key as a fresh buffer.
    fn to_key_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

impl Key for u64 {
    const KEY_TYPE: KeyType = KeyType::U64;

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_be_bytes());
    }

    fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() == 8 { Some(BigEndian::read_u64(buf)) } else { None }
    }
}

impl Key for Vec<u8> {
    const KEY_TYPE: KeyType = KeyType::Bytes;

    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self);
    }

    fn decode(buf: &[u8]) -> Option<Self> {
        Some(buf.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_encoding_preserves_order() {
        let values = [0u64, 1, 255, 256, 1 << 32, u64::MAX - 1, u64::MAX];
        for pair in values.windows(2) {
            assert!(pair[0].to_key_bytes() < pair[1].to_key_bytes());
        }
    }

    #[test]
    fn test_u64_decode() {
        let bytes = 0x0102_0304_0506_0708u64.to_key_bytes();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(u64::decode(&bytes), Some(0x0102_0304_0506_0708));
        assert_eq!(u64::decode(&bytes[..7]), None);
    }

    #[test]
    fn test_bytes_key_is_identity() {
        let key = b"volume/node".to_vec();
        assert_eq!(key.to_key_bytes(), key);
        assert_eq!(Vec::<u8>::decode(&key), Some(key));
        assert_eq!(<Vec<u8> as Key>::KEY_TYPE, KeyType::Bytes);
    }
}
