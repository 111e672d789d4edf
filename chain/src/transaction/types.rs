//! Core transaction data types shared across the builder, the node client,
//! and the submitter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::BLOCK_REF_LENGTH;
use crate::crypto::Address;

/// Errors from block-reference derivation.
#[derive(Debug, Error)]
pub enum BlockRefError {
    #[error("block id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("block id too short: need at least {BLOCK_REF_LENGTH} bytes, got {0}")]
    TooShort(usize),
}

/// One on-chain operation invocation: target, value, payload.
///
/// This system always bundles exactly one clause per transaction, but the
/// wire format carries a list and the type does not pretend otherwise.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Target contract address.
    pub to: Address,
    /// VET transferred alongside the call, in wei. Zero for every call in
    /// the grading flow.
    pub value: u128,
    /// ABI-encoded call data.
    pub data: Vec<u8>,
}

impl Clause {
    /// A plain contract call carrying no value.
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self { to, value: 0, data }
    }
}

/// An 8-byte reference to a recent block, binding the transaction to the
/// current chain (anti-replay across forks).
///
/// Always the fixed-length prefix of the referenced block's 32-byte id —
/// deterministic truncation regardless of how the node formats the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef([u8; BLOCK_REF_LENGTH]);

impl BlockRef {
    /// Derives a block reference from a node-reported block id
    /// (`0x`-prefixed hex, 32 bytes on a healthy node). Takes exactly the
    /// first [`BLOCK_REF_LENGTH`] bytes; rejects anything shorter rather
    /// than guessing.
    pub fn from_block_id(id: &str) -> Result<Self, BlockRefError> {
        let hex_part = id.trim().trim_start_matches("0x");
        let bytes = hex::decode(hex_part)
            .map_err(|e| BlockRefError::InvalidHex(e.to_string()))?;
        if bytes.len() < BLOCK_REF_LENGTH {
            return Err(BlockRefError::TooShort(bytes.len()));
        }
        let mut arr = [0u8; BLOCK_REF_LENGTH];
        arr.copy_from_slice(&bytes[..BLOCK_REF_LENGTH]);
        Ok(Self(arr))
    }

    pub const fn from_bytes(bytes: [u8; BLOCK_REF_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_REF_LENGTH] {
        &self.0
    }

    /// The reference interpreted as a big-endian integer, which is how the
    /// RLP layer encodes it.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A 32-byte transaction id, as computed at signing time and as reported
/// back by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId([u8; 32]);

impl TxId {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxId {
    type Err = BlockRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.trim().trim_start_matches("0x");
        let bytes =
            hex::decode(hex_part).map_err(|e| BlockRefError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| BlockRefError::TooShort(v.len()))?;
        Ok(Self(arr))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Block placement metadata the node attaches to a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptMeta {
    #[serde(rename = "blockID")]
    pub block_id: String,
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    #[serde(rename = "blockTimestamp")]
    pub block_timestamp: u64,
    #[serde(rename = "txID")]
    pub tx_id: Option<TxId>,
    #[serde(rename = "txOrigin")]
    pub tx_origin: Option<String>,
}

/// Node-reported outcome of an included transaction.
///
/// Does not exist until the node includes the transaction in a block; until
/// then, the receipt endpoint reports nothing and we keep polling. The one
/// field with protocol meaning to us is `reverted`; the rest are reported
/// to the caller as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// `true` when the transaction was included but its execution reverted.
    /// Gas was consumed, state was not changed. Distinct from the
    /// transaction never being included at all.
    pub reverted: bool,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub gas_payer: Option<String>,
    #[serde(default)]
    pub paid: Option<String>,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub meta: Option<ReceiptMeta>,
    /// Per-clause outputs (events, transfers). Passed through opaquely —
    /// the grading contract's events are the frontend's concern.
    #[serde(default)]
    pub outputs: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ref_takes_fixed_prefix() {
        let id = "0x0123456789abcdef00000000000000000000000000000000000000000000cafe";
        let r = BlockRef::from_block_id(id).unwrap();
        assert_eq!(r.as_bytes(), &[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
        assert_eq!(r.to_string(), "0x0123456789abcdef");
    }

    #[test]
    fn block_ref_truncation_ignores_trailing_length() {
        // Same 8-byte prefix, different tails — identical refs. The
        // truncation must not depend on the id's total length.
        let short = BlockRef::from_block_id("0x0123456789abcdef0000").unwrap();
        let long = BlockRef::from_block_id(
            "0x0123456789abcdefffffffffffffffffffffffffffffffffffffffffffffffff",
        )
        .unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn block_ref_rejects_short_ids() {
        let err = BlockRef::from_block_id("0x0123").unwrap_err();
        assert!(matches!(err, BlockRefError::TooShort(2)));
    }

    #[test]
    fn block_ref_rejects_non_hex() {
        assert!(matches!(
            BlockRef::from_block_id("0xnothex"),
            Err(BlockRefError::InvalidHex(_))
        ));
    }

    #[test]
    fn block_ref_as_integer() {
        let r = BlockRef::from_bytes([0, 0, 0, 0, 0, 0, 0x04, 0x00]);
        assert_eq!(r.as_u64(), 1024);
    }

    #[test]
    fn tx_id_roundtrips_through_string() {
        let id = TxId::from_bytes([0x5a; 32]);
        let parsed: TxId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn receipt_parses_thor_wire_shape() {
        let json = r#"{
            "gasUsed": 52852,
            "gasPayer": "0xd3ae78222beadb038203be21ed5ce7c9b1bff602",
            "paid": "0x723daf2",
            "reward": "0x22277",
            "reverted": false,
            "meta": {
                "blockID": "0x00003abac0432454bb6e6e53b16f9d344e06f91b7563b5c5cf0e48d14d0da6d6",
                "blockNumber": 15034,
                "blockTimestamp": 1530164750,
                "txID": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
                "txOrigin": "0xdb4027477b2a8fe4c83c6dafe7f86678bb1b8a8d"
            },
            "outputs": []
        }"#;
        let receipt: Receipt = serde_json::from_str(json).unwrap();
        assert!(!receipt.reverted);
        assert_eq!(receipt.gas_used, 52852);
        assert_eq!(receipt.meta.as_ref().unwrap().block_number, 15034);
    }

    #[test]
    fn receipt_tolerates_missing_optional_fields() {
        // A minimal node (or a fake one in tests) may report only the
        // reversion flag; everything else defaults.
        let receipt: Receipt = serde_json::from_str(r#"{"reverted": true}"#).unwrap();
        assert!(receipt.reverted);
        assert_eq!(receipt.gas_used, 0);
        assert!(receipt.meta.is_none());
    }

    #[test]
    fn clause_call_carries_no_value() {
        let to: Address = "0xcb0e9d8e05b70f9ed499398911a289570a9ccf24".parse().unwrap();
        let clause = Clause::call(to, vec![0xde, 0xad]);
        assert_eq!(clause.value, 0);
        assert_eq!(clause.to, to);
    }
}
