//! # Key Management
//!
//! secp256k1 keypair handling for the registrar identity.
//!
//! The registrar's private key is the only local authority in MERIT: whoever
//! holds it can produce signed grading transactions. Whether those
//! transactions *do* anything is the contract's call — it checks the
//! recovered sender against its stored registrar address on-chain. This
//! module signs; it never authorizes.
//!
//! ## Security considerations
//!
//! - Keys are loaded from process configuration at startup and held in
//!   memory only. Nothing here persists key material.
//! - `RegistrarKeypair` intentionally does NOT implement
//!   `Serialize`/`Deserialize`. Exporting a private key should be a
//!   deliberate act, not a side effect of a JSON response.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::keccak256;

/// Errors that can occur during key and address operations.
///
/// Deliberately vague about *why* key material was rejected — error messages
/// that describe secrets are a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid address: expected 0x-prefixed 40-hex-char string")]
    InvalidAddress,
}

/// A 20-byte on-chain account address.
///
/// Derived Ethereum-style: the last 20 bytes of
/// `keccak256(uncompressed_public_key[1..])`. Rendered as lowercase
/// `0x`-prefixed hex. This is the identity the contract compares against
/// its registrar slot, and the identity students are graded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps raw address bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = KeyError;

    /// Parses a `0x`-prefixed, 40-hex-character address. Case-insensitive;
    /// we do not enforce EIP-55 checksums because the addresses in this
    /// flow are configuration constants, not user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.strip_prefix("0x").ok_or(KeyError::InvalidAddress)?;
        let bytes = hex::decode(hex_part).map_err(|_| KeyError::InvalidAddress)?;
        let arr: [u8; 20] = bytes.try_into().map_err(|_| KeyError::InvalidAddress)?;
        Ok(Self(arr))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The registrar's secp256k1 keypair.
///
/// Wraps a `k256` signing key and exposes exactly the operations the
/// submission flow needs: address derivation and recoverable signatures
/// over 32-byte digests. The recoverable form matters — the network
/// recovers the sender from the signature rather than carrying the public
/// key in the transaction.
pub struct RegistrarKeypair {
    signing_key: SigningKey,
}

impl RegistrarKeypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    ///
    /// Used by tests and by operators bootstrapping a new registrar
    /// identity. Production keys come in through [`from_hex`](Self::from_hex).
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret key, with or without
    /// a `0x` prefix. This is the form the key takes in the registrar's
    /// environment configuration.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim().trim_start_matches("0x");
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// Derives the 20-byte on-chain address for this keypair.
    ///
    /// `keccak256` of the 64-byte uncompressed public key (the `0x04` tag
    /// byte stripped), last 20 bytes. The submitter logs this for
    /// diagnostics; the contract recomputes it independently from the
    /// transaction signature.
    pub fn address(&self) -> Address {
        let verifying_key: &VerifyingKey = self.signing_key.verifying_key();
        let point = verifying_key.to_encoded_point(false);
        // Skip the 0x04 uncompressed-point tag; hash the 64 coordinate bytes.
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest[12..]);
        Address(addr)
    }

    /// Signs a 32-byte digest, returning the 65-byte recoverable signature
    /// `r ‖ s ‖ v` the wire format expects (`v` is the raw recovery id,
    /// 0 or 1).
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; 65], KeyError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|_| KeyError::InvalidSecretKey)?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for RegistrarKeypair {
    /// Shows the derived address, never the key. A `{:?}` in a log line
    /// must not become a key leak.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrip_through_string() {
        let kp = RegistrarKeypair::generate();
        let addr = kp.address();
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn address_parsing_rejects_garbage() {
        assert!("not-an-address".parse::<Address>().is_err());
        // Missing 0x prefix.
        assert!("cb0e9d8e05b70f9ed499398911a289570a9ccf24"
            .parse::<Address>()
            .is_err());
        // Wrong length.
        assert!("0xcb0e9d".parse::<Address>().is_err());
    }

    #[test]
    fn address_parsing_accepts_mixed_case() {
        let lower = "0xcb0e9d8e05b70f9ed499398911a289570a9ccf24"
            .parse::<Address>()
            .unwrap();
        let upper = "0xCB0E9D8E05B70F9ED499398911A289570A9CCF24"
            .parse::<Address>()
            .unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn known_key_derives_known_address() {
        // Deterministic vector: the well-known all-ones test key.
        // Address recomputed independently with standard Ethereum tooling.
        let kp = RegistrarKeypair::from_hex(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        assert_eq!(
            kp.address().to_string(),
            "0x1a642f0e3c3af545e7acbd38b07251b3990914f1"
        );
    }

    #[test]
    fn from_hex_accepts_both_prefixes() {
        let with = RegistrarKeypair::from_hex(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        let without = RegistrarKeypair::from_hex(
            "0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        assert_eq!(with.address(), without.address());
    }

    #[test]
    fn from_hex_rejects_bad_material() {
        assert!(RegistrarKeypair::from_hex("0xdeadbeef").is_err());
        assert!(RegistrarKeypair::from_hex("zz").is_err());
        // Zero is not a valid secp256k1 scalar.
        assert!(RegistrarKeypair::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000000",
        )
        .is_err());
    }

    #[test]
    fn signature_is_65_bytes_with_small_recovery_id() {
        let kp = RegistrarKeypair::generate();
        let digest = crate::crypto::blake2b256(b"grade it");
        let sig = kp.sign_digest(&digest).unwrap();
        assert_eq!(sig.len(), 65);
        assert!(sig[64] <= 1, "recovery id must be 0 or 1");
    }

    #[test]
    fn signing_is_deterministic_per_key_and_digest() {
        // RFC 6979 deterministic nonces: same key + digest = same signature.
        let kp = RegistrarKeypair::from_hex(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        let digest = crate::crypto::blake2b256(b"same message");
        assert_eq!(kp.sign_digest(&digest).unwrap(), kp.sign_digest(&digest).unwrap());
    }

    #[test]
    fn different_keys_sign_differently() {
        let digest = crate::crypto::blake2b256(b"same message");
        let a = RegistrarKeypair::generate().sign_digest(&digest).unwrap();
        let b = RegistrarKeypair::generate().sign_digest(&digest).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let kp = RegistrarKeypair::from_hex(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap();
        let rendered = format!("{:?}", kp);
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("0101010101"));
    }
}
