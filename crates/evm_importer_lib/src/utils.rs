use chrono::{DateTime, TimeZone, Utc};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use sha3::{Digest, Keccak256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use web3::types::{Address, U256};

use crate::error::ImporterError;

#[derive(Debug, Clone)]
pub struct ConversionError {
    pub msg: String,
}

impl ConversionError {
    pub fn from(msg: String) -> Self {
        Self { msg }
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error during conversion: {}", self.msg)
    }
}

impl Error for ConversionError {
    fn description(&self) -> &str {
        "Conversion error"
    }
}

/// Parses a chain-native hex quantity with optional 0x prefix.
/// Empty encodings ("" and "0x") are a legitimate zero; anything else
/// that is not valid base-16 is an error.
pub fn hex_to_u256(hex: &str) -> Result<U256, ConversionError> {
    let clean_hex = hex.strip_prefix("0x").unwrap_or(hex);
    if clean_hex.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(clean_hex, 16)
        .map_err(|_| ConversionError::from(format!("Invalid hex number: {hex}")))
}

pub fn hex_to_ascii(hex_str: &str) -> Result<String, ConversionError> {
    let decoded = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))
        .map_err(|err| ConversionError::from(format!("Invalid hex string {hex_str}: {err}")))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

pub fn epoch_to_time_utc(epoch: i64) -> Result<DateTime<Utc>, ConversionError> {
    Utc.timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| ConversionError::from(format!("Invalid epoch seconds: {epoch}")))
}

/// EIP-155 chain id recovery: chain_id = (v - 35) / 2.
/// Accepts 0x-prefixed hex or a decimal literal.
pub fn derive_chain_id(v: &str) -> Result<u64, ImporterError> {
    let v_value = if let Some(hex) = v.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        v.parse::<u64>()
    }
    .map_err(|_| ImporterError::ParsingError(format!("Failed to parse V value: {v}")))?;

    if v_value < 35 {
        return Err(ImporterError::ParsingError(format!(
            "V value {v_value} is below the EIP-155 range"
        )));
    }
    Ok((v_value - 35) / 2)
}

/// Recovers the signer address from an ECDSA signature and a 32 byte
/// message hash. r, s, v and hash are chain-native hex strings.
pub fn derive_public_key(r: &str, s: &str, v: &str, hash: &str) -> Result<Address, ImporterError> {
    let r = hex_to_u256(r)?;
    let s = hex_to_u256(s)?;
    let v = hex_to_u256(v)?.low_u64();

    let mut signature = [0u8; 64];
    r.to_big_endian(&mut signature[0..32]);
    s.to_big_endian(&mut signature[32..64]);

    let recovery_id = match v {
        0 | 1 => v as i32,
        27 | 28 => (v - 27) as i32,
        v if v >= 35 => ((v - 35) % 2) as i32,
        _ => {
            return Err(ImporterError::ParsingError(format!(
                "V value {v} is not a valid recovery id"
            )))
        }
    };

    let hash_bytes = hex::decode(hash.strip_prefix("0x").unwrap_or(hash))
        .map_err(|err| ConversionError::from(format!("Invalid message hash {hash}: {err}")))?;

    let message = Message::from_slice(&hash_bytes)?;
    let signature =
        RecoverableSignature::from_compact(&signature, RecoveryId::from_i32(recovery_id)?)?;
    let public_key = Secp256k1::new().recover_ecdsa(&message, &signature)?;

    Ok(Address::from_slice(
        &Keccak256::digest(&public_key.serialize_uncompressed()[1..65]).as_slice()[12..],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::SecretKey;
    use std::str::FromStr;

    #[test]
    fn test_hex_to_u256() {
        assert_eq!(hex_to_u256("0x1").unwrap(), U256::from(1));
        assert_eq!(hex_to_u256("ff").unwrap(), U256::from(255));
        assert_eq!(hex_to_u256("0x0").unwrap(), U256::zero());
        assert_eq!(hex_to_u256("").unwrap(), U256::zero());
        assert_eq!(hex_to_u256("0x").unwrap(), U256::zero());
        // 2^64 + 1 does not fit in a machine word
        assert_eq!(
            hex_to_u256("0x10000000000000001").unwrap(),
            U256::from_dec_str("18446744073709551617").unwrap()
        );
        assert!(hex_to_u256("0xzz").is_err());
        assert!(hex_to_u256("12fg").is_err());
    }

    #[test]
    fn test_hex_to_ascii() {
        assert_eq!(hex_to_ascii("0x67657468").unwrap(), "geth");
        assert_eq!(hex_to_ascii("72657468").unwrap(), "reth");
        assert_eq!(hex_to_ascii("0x").unwrap(), "");
        assert!(hex_to_ascii("0x123").is_err());
        assert!(hex_to_ascii("0xgg").is_err());
    }

    #[test]
    fn test_epoch_to_time_utc() {
        let time = epoch_to_time_utc(1689600000).unwrap();
        assert_eq!(time.timestamp(), 1689600000);
        assert_eq!(time.to_rfc3339(), "2023-07-17T13:20:00+00:00");
    }

    #[test]
    fn test_derive_chain_id() {
        assert_eq!(derive_chain_id("0x25").unwrap(), 1);
        assert_eq!(derive_chain_id("0x26").unwrap(), 1);
        assert_eq!(derive_chain_id("37").unwrap(), 1);
        assert_eq!(derive_chain_id("38").unwrap(), 1);
        assert_eq!(derive_chain_id("35").unwrap(), 0);
        assert_eq!(derive_chain_id("0x135").unwrap(), 137);
        assert!(derive_chain_id("27").is_err());
        assert!(derive_chain_id("abc").is_err());
    }

    #[test]
    fn test_derive_public_key() {
        let secp = Secp256k1::new();
        let sk =
            SecretKey::from_str("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap();
        let hash = Keccak256::digest(b"importer");
        let message = Message::from_slice(hash.as_slice()).unwrap();

        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &sk)
            .serialize_compact();

        let r = format!("0x{}", hex::encode(&compact[0..32]));
        let s = format!("0x{}", hex::encode(&compact[32..64]));
        let v = format!("0x{:x}", 27 + recovery_id.to_i32());

        let addr = derive_public_key(&r, &s, &v, &hex::encode(hash)).unwrap();
        assert_eq!(
            format!("{:#x}", addr),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_derive_public_key_rejects_malformed_input() {
        assert!(derive_public_key("0x1", "0x2", "0x3", "0xdeadbeef").is_err());
        assert!(derive_public_key("0xzz", "0x2", "0x1b", "0xdeadbeef").is_err());
    }
}
