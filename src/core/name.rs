//! Account, action and permission names.
//!
//! A name packs up to 13 characters from `.12345abcdefghijklmnopqrstuvwxyz` into a
//! `u64`: 12 characters of 5 bits each, then a 13th character of 4 bits. Trailing
//! dots are insignificant, so `"alice"` and `"alice..."` are the same name.

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChainError, Result};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
pub const MAX_NAME_LEN: usize = 13;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Name(u64);

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl Name {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for Name {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_NAME_LEN {
            return Err(ChainError::MalformedEncoding(format!(
                "Name \"{}\" is longer than {} characters",
                s, MAX_NAME_LEN
            )));
        }
        let mut value = 0u64;
        for (i, &c) in bytes.iter().enumerate() {
            let symbol = char_to_symbol(c).ok_or_else(|| {
                ChainError::MalformedEncoding(format!("Invalid character {:?} in name \"{}\"", c as char, s))
            })?;
            if i < 12 {
                value |= symbol << (64 - 5 * (i + 1));
            } else {
                if symbol > 0x0f {
                    return Err(ChainError::MalformedEncoding(format!(
                        "Thirteenth character of name \"{}\" must be one of .12345abcdefghij",
                        s
                    )));
                }
                value |= symbol;
            }
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[MAX_NAME_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let end = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // CHARMAP is ASCII
        f.write_str(std::str::from_utf8(&out[..end]).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            u64::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_text() {
        for s in ["eosio", "eosio.token", "bisbpa", "a", "zzzzzzzzzzzzj", "12345"] {
            let name: Name = s.parse().unwrap();
            assert_eq!(name.to_string(), s);
        }
    }

    #[test]
    fn test_known_value() {
        // Reference value of "eosio" in the 5-bit packing.
        let name: Name = "eosio".parse().unwrap();
        assert_eq!(name.value(), 6138663577826885632);
    }

    #[test]
    fn test_empty_name_is_zero() {
        let name: Name = "".parse().unwrap();
        assert_eq!(name.value(), 0);
        assert_eq!(name.to_string(), "");
    }

    #[test]
    fn test_trailing_dots_ignored() {
        let a: Name = "alice".parse().unwrap();
        let b: Name = "alice...".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!("Alice".parse::<Name>().is_err());
        assert!("alice6".parse::<Name>().is_err());
        assert!("aaaaaaaaaaaaaa".parse::<Name>().is_err());
        assert!("aaaaaaaaaaaaz".parse::<Name>().is_err());
    }

    #[test]
    fn test_json_is_text() {
        let name: Name = "bob".parse().unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"bob\"");
    }
}
