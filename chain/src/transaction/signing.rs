//! Transaction signing with the registrar's secp256k1 key.
//!
//! Signing is a separate step from building because the key may not be
//! available where the body is constructed. The signed result is immutable
//! and meant to be broadcast exactly once — resigning the same body yields
//! the same bytes (RFC 6979), so "exactly once" is a submitter discipline,
//! not a cryptographic guarantee.
//!
//! The id is derived Thor-style:
//! `blake2b256(signing_hash ‖ signer_address)`. The signer address is baked
//! into the id even though it travels nowhere in the wire bytes — the
//! network recovers it from the signature and computes the same id.

use super::builder::TransactionBody;
use super::rlp;
use super::types::TxId;
use crate::crypto::hash::blake2b256_multi;
use crate::crypto::{Address, KeyError, RegistrarKeypair};

/// A signed, wire-ready transaction.
///
/// Immutable once constructed. The signature is the 65-byte recoverable
/// form over the body's signing hash.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    body: TransactionBody,
    signature: [u8; 65],
    signer: Address,
}

impl SignedTransaction {
    /// The underlying body.
    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    /// The address the signature recovers to.
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// The transaction id: `blake2b256(signing_hash ‖ signer_address)`.
    /// Known before broadcast; the node reports the same value back.
    pub fn id(&self) -> TxId {
        let digest = blake2b256_multi(&[&self.body.signing_hash(), self.signer.as_bytes()]);
        TxId::from_bytes(digest)
    }

    /// The wire encoding: the body's RLP field list with the signature
    /// appended as a final byte-string item.
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = self.body.encode_fields();
        payload.extend_from_slice(&rlp::bytes(&self.signature));
        rlp::list(&payload)
    }

    /// The wire encoding as the `0x`-prefixed hex string the node's
    /// broadcast endpoint takes.
    pub fn encode_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }
}

/// Signs a transaction body with the registrar keypair.
///
/// # Errors
///
/// Returns [`KeyError`] if the underlying ECDSA signing operation fails
/// (in practice: never for a validly constructed key, but we don't panic
/// on "in practice").
pub fn sign_transaction(
    body: TransactionBody,
    keypair: &RegistrarKeypair,
) -> Result<SignedTransaction, KeyError> {
    let digest = body.signing_hash();
    let signature = keypair.sign_digest(&digest)?;
    Ok(SignedTransaction {
        body,
        signature,
        signer: keypair.address(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CHAIN_TAG_TESTNET;
    use crate::transaction::{BlockRef, Clause, TransactionBuilder};

    fn keypair() -> RegistrarKeypair {
        RegistrarKeypair::from_hex(
            "0x0101010101010101010101010101010101010101010101010101010101010101",
        )
        .unwrap()
    }

    fn sample_body() -> TransactionBody {
        TransactionBuilder::new(CHAIN_TAG_TESTNET)
            .block_ref(BlockRef::from_bytes([0x00, 0x00, 0x3a, 0xba, 0xc0, 0x43, 0x24, 0x54]))
            .clause(Clause::call(
                "0xcb0e9d8e05b70f9ed499398911a289570a9ccf24".parse().unwrap(),
                vec![0xca, 0xfe],
            ))
            .nonce(1_700_000_000_000)
            .build()
    }

    #[test]
    fn signing_preserves_the_body() {
        let body = sample_body();
        let signed = sign_transaction(body.clone(), &keypair()).unwrap();
        assert_eq!(signed.body(), &body);
    }

    #[test]
    fn signer_matches_keypair_address() {
        let kp = keypair();
        let signed = sign_transaction(sample_body(), &kp).unwrap();
        assert_eq!(signed.signer(), kp.address());
    }

    #[test]
    fn id_is_stable_and_key_dependent() {
        let kp = keypair();
        let a = sign_transaction(sample_body(), &kp).unwrap();
        let b = sign_transaction(sample_body(), &kp).unwrap();
        assert_eq!(a.id(), b.id(), "same body + key must give the same id");

        let other = sign_transaction(sample_body(), &RegistrarKeypair::generate()).unwrap();
        assert_ne!(a.id(), other.id(), "the id binds the signer address");
    }

    #[test]
    fn signed_encoding_extends_unsigned_by_the_signature_item() {
        let signed = sign_transaction(sample_body(), &keypair()).unwrap();
        let unsigned_len = signed.body().encode_unsigned().len();
        let signed_len = signed.encode().len();
        // 65 signature bytes + 2-byte string header; the outer list header
        // may also grow by a byte when the payload crosses 55 bytes, so
        // assert a lower bound rather than an exact delta.
        assert!(signed_len >= unsigned_len + 67);
    }

    #[test]
    fn encode_hex_is_prefixed_lowercase() {
        let signed = sign_transaction(sample_body(), &keypair()).unwrap();
        let raw = signed.encode_hex();
        assert!(raw.starts_with("0x"));
        assert!(raw[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(raw.len(), 2 + signed.encode().len() * 2);
    }

    #[test]
    fn different_nonces_give_different_ids() {
        // The property the nonce exists for: rapid successive submissions
        // from one key must never collide on id.
        let kp = keypair();
        let mut b = sample_body();
        b.nonce += 1;
        let first = sign_transaction(sample_body(), &kp).unwrap();
        let second = sign_transaction(b, &kp).unwrap();
        assert_ne!(first.id(), second.id());
    }
}
