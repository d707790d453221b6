//! Minimal Solidity ABI codec: static arguments in, static words and
//! strings out. Enough for the staking and token contracts, nothing more.

use sha3::{Digest, Keccak256};

use super::address::{decode_hex, encode_hex, Address};
use crate::error::{Result, StakingError};

pub const WORD: usize = 32;

/// Static call argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(u128),
}

pub fn keccak(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the signature hash, e.g. `stake(uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `topic0` of an event, `0x`-hex.
pub fn event_topic(signature: &str) -> String {
    encode_hex(&keccak(signature.as_bytes()))
}

pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&encode_word(arg));
    }
    data
}

pub fn encode_word(token: &Token) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    match token {
        Token::Address(addr) => word[12..].copy_from_slice(addr.as_bytes()),
        Token::Uint(value) => word[16..].copy_from_slice(&value.to_be_bytes()),
    }
    word
}

/// Hex payload from the node → bytes.
pub fn decode_payload(data: &str) -> Result<Vec<u8>> {
    decode_hex(data).map_err(StakingError::Decode)
}

fn word(data: &[u8], index: usize) -> Result<&[u8]> {
    let start = index * WORD;
    data.get(start..start + WORD).ok_or_else(|| {
        StakingError::Decode(format!(
            "expected at least {} words, got {} bytes",
            index + 1,
            data.len()
        ))
    })
}

/// `uint256` narrowed to `u128`; anything wider is rejected.
pub fn decode_uint(data: &[u8], index: usize) -> Result<u128> {
    let w = word(data, index)?;
    if w[..16].iter().any(|&b| b != 0) {
        return Err(StakingError::Decode("uint256 does not fit in u128".to_string()));
    }
    let low: [u8; 16] = w[16..]
        .try_into()
        .map_err(|_| StakingError::Decode("short word".to_string()))?;
    Ok(u128::from_be_bytes(low))
}

pub fn decode_u64(data: &[u8], index: usize) -> Result<u64> {
    let value = decode_uint(data, index)?;
    u64::try_from(value).map_err(|_| StakingError::Decode("value does not fit in u64".to_string()))
}

pub fn decode_bool(data: &[u8], index: usize) -> Result<bool> {
    match decode_uint(data, index)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StakingError::Decode(format!("invalid bool {}", other))),
    }
}

pub fn decode_address(data: &[u8], index: usize) -> Result<Address> {
    let w = word(data, index)?;
    if w[..12].iter().any(|&b| b != 0) {
        return Err(StakingError::Decode("dirty address padding".to_string()));
    }
    let bytes: [u8; 20] = w[12..]
        .try_into()
        .map_err(|_| StakingError::Decode("short word".to_string()))?;
    Ok(Address::new(bytes))
}

/// Dynamic `string` return value. A bare 32-byte word is read as a
/// NUL-padded `bytes32`, which some older tokens return for `symbol()`.
pub fn decode_string(data: &[u8]) -> Result<String> {
    if data.len() == WORD {
        let end = data.iter().position(|&b| b == 0).unwrap_or(WORD);
        return String::from_utf8(data[..end].to_vec())
            .map_err(|e| StakingError::Decode(e.to_string()));
    }
    let offset = usize::try_from(decode_uint(data, 0)?)
        .map_err(|_| StakingError::Decode("string offset too large".to_string()))?;
    if offset % WORD != 0 {
        return Err(StakingError::Decode("misaligned string offset".to_string()));
    }
    let len = usize::try_from(decode_uint(data, offset / WORD)?)
        .map_err(|_| StakingError::Decode("string length too large".to_string()))?;
    let start = offset + WORD;
    let bytes = data
        .get(start..start + len)
        .ok_or_else(|| StakingError::Decode("string out of bounds".to_string()))?;
    String::from_utf8(bytes.to_vec()).map_err(|e| StakingError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hex4(sel: [u8; 4]) -> String {
        encode_hex(&sel)
    }

    #[test]
    fn known_selectors() {
        assert_eq!(hex4(selector("transfer(address,uint256)")), "0xa9059cbb");
        assert_eq!(hex4(selector("approve(address,uint256)")), "0x095ea7b3");
        assert_eq!(hex4(selector("balanceOf(address)")), "0x70a08231");
        assert_eq!(hex4(selector("allowance(address,address)")), "0xdd62ed3e");
        assert_eq!(hex4(selector("symbol()")), "0x95d89b41");
        assert_eq!(hex4(selector("name()")), "0x06fdde03");
        assert_eq!(hex4(selector("withdraw(uint256)")), "0x2e1a7d4d");
    }

    #[test]
    fn known_event_topic() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn encodes_static_arguments() {
        let spender: Address = "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap();
        let data = encode_call(
            "approve(address,uint256)",
            &[Token::Address(spender), Token::Uint(1_000_000_000_000_000_000)],
        );
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(
            encode_hex(&data),
            "0x095ea7b3\
             0000000000000000000000005fbdb2315678afecb367f032d93f642f64180aa3\
             0000000000000000000000000000000000000000000000000de0b6b3a7640000"
        );
    }

    #[test]
    fn decodes_words() {
        let mut data = vec![0u8; 96];
        data[31] = 42;
        data[63] = 1;
        data[95] = 0xaa;
        assert_eq!(decode_uint(&data, 0).unwrap(), 42);
        assert!(decode_bool(&data, 1).unwrap());
        assert_eq!(
            decode_address(&data, 2).unwrap().to_string(),
            "0x00000000000000000000000000000000000000aa"
        );
        assert!(decode_uint(&data, 3).is_err());
    }

    #[test]
    fn rejects_uint_wider_than_u128() {
        let mut data = vec![0u8; 32];
        data[0] = 1;
        assert!(decode_uint(&data, 0).is_err());
    }

    #[test]
    fn decodes_dynamic_string() {
        let mut data = vec![0u8; 96];
        data[31] = 0x20;
        data[63] = 3;
        data[64..67].copy_from_slice(b"STK");
        assert_eq!(decode_string(&data).unwrap(), "STK");
    }

    #[test]
    fn decodes_bytes32_string() {
        let mut data = vec![0u8; 32];
        data[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_string(&data).unwrap(), "MKR");
    }
}
