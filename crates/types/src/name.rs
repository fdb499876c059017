//! Account and volume names.
//!
//! Names follow the ledger's account-name encoding: up to 12 symbols drawn from
//! `.12345abcdefghijklmnopqrstuvwxyz`, packed five bits per symbol into a `u64`
//! with the first symbol in the most significant bits. `.` is the separator:
//! `sub.parent` is a sub-name of `parent`.
//!
//! The packed value orders the same way as the symbol sequence, so it doubles
//! as a big-endian storage prefix for per-volume partitions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use snafu::Snafu;

/// Maximum number of symbols in a name.
pub const MAX_NAME_LEN: usize = 12;

/// The separator symbol.
pub const SEPARATOR: char = '.';

/// Symbol alphabet, indexed by 5-bit symbol value.
const ALPHABET: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Bits of the packed value that would hold a thirteenth symbol.
const TAIL_MASK: u64 = 0x0F;

/// Errors from parsing or decoding a [`Name`].
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum NameError {
    /// The name is empty.
    #[snafu(display("name must not be empty"))]
    Empty,

    /// The name has more than [`MAX_NAME_LEN`] symbols.
    #[snafu(display("name has {len} characters; maximum is {MAX_NAME_LEN}"))]
    TooLong {
        /// Number of characters in the rejected input.
        len: usize,
    },

    /// The name contains a character outside the alphabet.
    #[snafu(display(
        "invalid character {ch:?} at position {position}; allowed: [.12345a-z]"
    ))]
    InvalidCharacter {
        /// The offending character.
        ch: char,
        /// Zero-based character position.
        position: usize,
    },

    /// The name ends with a separator, which the packed encoding cannot represent.
    #[snafu(display("name must not end with '{SEPARATOR}'"))]
    TrailingSeparator,

    /// A packed value uses the thirteenth-symbol bits.
    #[snafu(display("packed name {value:#018x} uses a thirteenth symbol"))]
    ThirteenthSymbol {
        /// The rejected packed value.
        value: u64,
    },
}

/// A ledger account or volume name.
///
/// `Name::default()` is the empty name. It never parses from text, so no
/// account can hold it.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u64);

/// Structural classification of a name, used to drive claim authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameClass {
    /// Number of symbols.
    pub length: usize,
    /// True when the name is shorter than [`MAX_NAME_LEN`] and therefore scarce.
    pub is_short: bool,
    /// The part after the last separator, or the whole name.
    pub suffix: Name,
    /// True when the name has no separator.
    pub is_top_level: bool,
}

impl NameClass {
    /// Full-length top-level names are abundant and claimable by anyone.
    /// Everything else is gated.
    pub fn is_restricted(&self) -> bool {
        self.is_short || !self.is_top_level
    }
}

impl Name {
    /// Builds a name from its packed value without validation.
    ///
    /// Prefer [`Name::try_from`] for values that did not originate from a `Name`.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the packed value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns true for the empty name.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Unpacks the twelve 5-bit symbol slots.
    fn symbols(self) -> [u8; MAX_NAME_LEN] {
        let mut out = [0u8; MAX_NAME_LEN];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = ((self.0 >> (59 - 5 * i)) & 0x1F) as u8;
        }
        out
    }

    fn from_symbols(symbols: &[u8]) -> Self {
        let mut value = 0u64;
        for (i, &sym) in symbols.iter().take(MAX_NAME_LEN).enumerate() {
            value |= u64::from(sym & 0x1F) << (59 - 5 * i);
        }
        Self(value)
    }

    /// Number of symbols, ignoring trailing separators.
    pub fn length(self) -> usize {
        let symbols = self.symbols();
        symbols.iter().rposition(|&s| s != 0).map_or(0, |last| last + 1)
    }

    /// The part after the last separator. A top-level name is its own suffix.
    pub fn suffix(self) -> Name {
        let symbols = self.symbols();
        let len = self.length();
        match symbols[..len].iter().rposition(|&s| s == 0) {
            Some(dot) => Self::from_symbols(&symbols[dot + 1..len]),
            None => self,
        }
    }

    /// True when the name contains no separator.
    pub fn is_top_level(self) -> bool {
        self.suffix() == self
    }

    /// True when the name is shorter than [`MAX_NAME_LEN`].
    pub fn is_short(self) -> bool {
        self.length() < MAX_NAME_LEN
    }

    /// Classifies the name for claim authorization.
    pub fn classify(self) -> NameClass {
        let length = self.length();
        let suffix = self.suffix();
        NameClass { length, is_short: length < MAX_NAME_LEN, suffix, is_top_level: suffix == self }
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        let len = s.chars().count();
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong { len });
        }

        let mut symbols = [0u8; MAX_NAME_LEN];
        for (position, ch) in s.chars().enumerate() {
            let sym = symbol_for(ch).ok_or(NameError::InvalidCharacter { ch, position })?;
            symbols[position] = sym;
        }
        if s.ends_with(SEPARATOR) {
            return Err(NameError::TrailingSeparator);
        }

        Ok(Self::from_symbols(&symbols[..len]))
    }
}

fn symbol_for(ch: char) -> Option<u8> {
    match ch {
        '.' => Some(0),
        '1'..='5' => Some(ch as u8 - b'1' + 1),
        'a'..='z' => Some(ch as u8 - b'a' + 6),
        _ => None,
    }
}

impl TryFrom<u64> for Name {
    type Error = NameError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value & TAIL_MASK != 0 {
            return Err(NameError::ThirteenthSymbol { value });
        }
        if value == 0 {
            return Err(NameError::Empty);
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for Name {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.length();
        let text: String =
            self.symbols()[..len].iter().map(|&s| char::from(ALPHABET[s as usize])).collect();
        f.write_str(&text)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({self})")
    }
}

impl Serialize for Name {
    /// Fails for the empty default name, which neither form can read back.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Name::try_from(self.0).map_err(ser::Error::custom)?;
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(de::Error::custom)
        } else {
            let value = u64::deserialize(deserializer)?;
            Name::try_from(value).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn name(s: &str) -> Name {
        s.parse().expect("valid name")
    }

    #[test]
    fn test_parse_and_display() {
        for s in ["a", "eosio", "abcdefghijkl", "sub.parent", "a.b.c", "12345", ".lead"] {
            assert_eq!(name(s).to_string(), s);
        }
    }

    #[test]
    fn test_known_packed_value() {
        // "eosio" under the ledger's account-name encoding.
        assert_eq!(name("eosio").value(), 6_138_663_577_826_885_632);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!("".parse::<Name>(), Err(NameError::Empty));
    }

    #[test]
    fn test_too_long_rejected() {
        assert_eq!("abcdefghijklm".parse::<Name>(), Err(NameError::TooLong { len: 13 }));
    }

    #[test]
    fn test_invalid_characters_rejected() {
        assert_eq!(
            "abc6".parse::<Name>(),
            Err(NameError::InvalidCharacter { ch: '6', position: 3 })
        );
        assert!(matches!("Alice".parse::<Name>(), Err(NameError::InvalidCharacter { .. })));
        assert!(matches!("caf\u{e9}".parse::<Name>(), Err(NameError::InvalidCharacter { .. })));
    }

    #[test]
    fn test_trailing_separator_rejected() {
        assert_eq!("abc.".parse::<Name>(), Err(NameError::TrailingSeparator));
        assert_eq!(".".parse::<Name>(), Err(NameError::TrailingSeparator));
    }

    #[test]
    fn test_length() {
        assert_eq!(name("a").length(), 1);
        assert_eq!(name("sub.parent").length(), 10);
        assert_eq!(name("abcdefghijkl").length(), 12);
        assert_eq!(Name::default().length(), 0);
    }

    #[test]
    fn test_suffix_of_top_level_is_self() {
        let n = name("alice");
        assert_eq!(n.suffix(), n);
        assert!(n.is_top_level());
    }

    #[test]
    fn test_suffix_after_last_separator() {
        assert_eq!(name("sub.parent").suffix(), name("parent"));
        assert_eq!(name("a.b.c").suffix(), name("c"));
        assert_eq!(name(".lead").suffix(), name("lead"));
        assert!(!name("sub.parent").is_top_level());
    }

    #[test]
    fn test_classify() {
        let class = name("abcdefghijkl").classify();
        assert!(!class.is_short);
        assert!(class.is_top_level);
        assert!(!class.is_restricted());

        let class = name("short").classify();
        assert!(class.is_short);
        assert!(class.is_restricted());

        let class = name("abcdefg.hijk").classify();
        assert!(!class.is_short);
        assert!(!class.is_top_level);
        assert_eq!(class.suffix, name("hijk"));
        assert!(class.is_restricted());
    }

    #[test]
    fn test_ordering_follows_alphabet() {
        assert!(name("a") < name("b"));
        assert!(name("a") < name("aa"));
        assert!(name("1") < name("a"));
    }

    #[test]
    fn test_try_from_raw_value() {
        let n = name("bob");
        assert_eq!(Name::try_from(n.value()), Ok(n));
        assert_eq!(Name::try_from(0u64), Err(NameError::Empty));
        assert!(matches!(Name::try_from(1u64), Err(NameError::ThirteenthSymbol { .. })));
    }

    #[test]
    fn test_serde_text_and_binary() {
        let n = name("sub.parent");
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "\"sub.parent\"");
        assert_eq!(serde_json::from_str::<Name>(&json).unwrap(), n);

        let bytes = postcard::to_allocvec(&n).unwrap();
        assert_eq!(postcard::from_bytes::<Name>(&bytes).unwrap(), n);

        assert!(serde_json::from_str::<Name>("\"Bad\"").is_err());
    }

    #[test]
    fn test_serialize_rejects_empty_name() {
        let empty = Name::default();
        assert!(serde_json::to_string(&empty).is_err());
        assert!(postcard::to_allocvec(&empty).is_err());
    }

    proptest! {
        #[test]
        fn parse_never_panics(s in "\\PC{0,16}") {
            let _ = s.parse::<Name>();
        }

        #[test]
        fn display_parse_roundtrip(s in "[a-z1-5][a-z1-5.]{0,10}[a-z1-5]") {
            let n: Name = s.parse().unwrap();
            prop_assert_eq!(n.to_string(), s.clone());
            prop_assert_eq!(n.length(), s.len());
        }

        #[test]
        fn suffix_matches_text_split(s in "[a-z1-5][a-z1-5.]{0,10}[a-z1-5]") {
            let n: Name = s.parse().unwrap();
            let expected = s.rsplit('.').next().unwrap_or(s.as_str()).to_string();
            prop_assert_eq!(n.suffix().to_string(), expected);
        }
    }
}
