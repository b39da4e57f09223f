//! USB identifiers - 16-bit vendor and product ids
//!
//! Canonical text form is four lowercase hex digits (`1d6b`, `0002`).
//! User input is accepted case-insensitively, with surrounding whitespace
//! and with or without leading zeros (`1D6B`, ` 2 `, `00002`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 16-bit USB vendor or device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsbId(u16);

impl UsbId {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Parse user supplied input into an id.
    ///
    /// Leading zeros and surrounding whitespace are ignored; at most four
    /// significant hex digits may remain.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidQuery("empty id".to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidQuery(format!("'{}' is not a hexadecimal id", trimmed)));
        }

        let significant = trimmed.trim_start_matches('0');
        if significant.len() > 4 {
            return Err(Error::InvalidQuery(format!(
                "'{}' is longer than four hex digits",
                trimmed
            )));
        }
        if significant.is_empty() {
            return Ok(Self(0));
        }

        u16::from_str_radix(significant, 16)
            .map(Self)
            .map_err(|_| Error::InvalidQuery(format!("'{}' is not a hexadecimal id", trimmed)))
    }

    /// Parse an id exactly as it appears in the registry: four hex digits.
    pub fn from_registry(token: &str) -> Option<Self> {
        if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u16::from_str_radix(token, 16).ok().map(Self)
    }

    /// Canonical four-digit lowercase form, as stored.
    pub fn to_hex(&self) -> String {
        format!("{:04x}", self.0)
    }
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl FromStr for UsbId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u16> for UsbId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl Serialize for UsbId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for UsbId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UsbId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_padding() {
        assert_eq!(UsbId::parse("1D6B").unwrap().to_hex(), "1d6b");
        assert_eq!(UsbId::parse("  2 ").unwrap().to_hex(), "0002");
        assert_eq!(UsbId::parse("00002").unwrap().to_hex(), "0002");
        assert_eq!(UsbId::parse("0000").unwrap().to_hex(), "0000");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(UsbId::parse(""), Err(Error::InvalidQuery(_))));
        assert!(matches!(UsbId::parse("   "), Err(Error::InvalidQuery(_))));
        assert!(matches!(UsbId::parse("12g4"), Err(Error::InvalidQuery(_))));
        assert!(matches!(UsbId::parse("0x1d6b"), Err(Error::InvalidQuery(_))));
        assert!(matches!(UsbId::parse("12345"), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_registry_tokens_are_strict() {
        assert_eq!(UsbId::from_registry("8086"), Some(UsbId::new(0x8086)));
        assert_eq!(UsbId::from_registry("ABCD"), Some(UsbId::new(0xabcd)));
        assert_eq!(UsbId::from_registry("123"), None);
        assert_eq!(UsbId::from_registry("12x4"), None);
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&UsbId::new(0x1d6b)).unwrap();
        assert_eq!(json, "\"1d6b\"");
        let back: UsbId = serde_json::from_str("\"1D6B\"").unwrap();
        assert_eq!(back, UsbId::new(0x1d6b));
    }
}
