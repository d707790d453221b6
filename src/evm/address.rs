use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StakingError;

/// 20-byte account or contract address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x1234…abcd` for compact display.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl FromStr for Address {
    type Err = StakingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s.trim())
            .map_err(|e| StakingError::Decode(format!("address {}: {}", s.trim(), e)))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| StakingError::Decode(format!("address {} must be 20 bytes", s.trim())))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_hex(&self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Transaction hash as handed back by the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> String {
        if self.0.len() <= 14 {
            return self.0.clone();
        }
        format!("{}…{}", &self.0[..10], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case `0x`-prefixed hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for &b in bytes {
        out.push(nibble_to_hex(b >> 4));
        out.push(nibble_to_hex(b & 0x0f));
    }
    out
}

/// Accepts an optional `0x` prefix and either case.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, String> {
    let digits = data
        .strip_prefix("0x")
        .or_else(|| data.strip_prefix("0X"))
        .unwrap_or(data);
    if digits.len() % 2 != 0 {
        return Err("odd number of hex digits".to_string());
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| Ok((hex_to_nibble(pair[0])? << 4) | hex_to_nibble(pair[1])?))
        .collect()
}

fn nibble_to_hex(n: u8) -> char {
    match n {
        0..=9 => (b'0' + n) as char,
        _ => (b'a' + (n - 10)) as char,
    }
}

fn hex_to_nibble(c: u8) -> Result<u8, String> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(format!("invalid hex digit '{}'", c as char)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn address_parses_mixed_case() {
        let addr: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        assert_eq!(addr.to_string(), "0x5fbdb2315678afecb367f032d93f642f64180aa3");
        assert_eq!(addr.short(), "0x5fbd…0aa3");
    }

    #[test]
    fn address_rejects_wrong_length_and_garbage() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzzbdb2315678afecb367f032d93f642f64180aa3".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(encode_hex(&[0x00, 0xab, 0x10]), "0x00ab10");
        assert_eq!(decode_hex("0x00AB10").unwrap(), vec![0x00, 0xab, 0x10]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0xabc").is_err());
    }

    #[test]
    fn tx_hash_short_form() {
        let hash = TxHash::new("0x8f3c5a9e0d1b2c3d4e5f60718293a4b5c6d7e8f9011223344556677889900aabb");
        assert_eq!(hash.short(), "0x8f3c5a9e…aabb");
        assert_eq!(TxHash::new("0xabc").short(), "0xabc");
    }
}
