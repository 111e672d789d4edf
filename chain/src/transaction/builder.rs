//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow: set
//! the required fields, call `.build()`, and get back an unsigned
//! [`TransactionBody`] whose signing hash is a pure function of its
//! contents.
//!
//! The builder does not sign — that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.

use super::rlp;
use super::types::{BlockRef, Clause, TxId};
use crate::config::{TX_EXPIRATION_BLOCKS, TX_GAS_LIMIT, TX_GAS_PRICE_COEF};
use crate::crypto::hash::blake2b256;

/// An unsigned Thor transaction body.
///
/// Built fresh per submission: the `block_ref` pins it to the chain's best
/// block at construction time, and staleness beyond `expiration` blocks
/// makes the network reject inclusion silently (observed by the submitter
/// as a confirmation timeout, not as a typed error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    /// Last byte of the genesis block id; prevents cross-network replay.
    pub chain_tag: u8,
    /// 8-byte prefix of a recent block id; prevents cross-fork replay.
    pub block_ref: BlockRef,
    /// Inclusion window in blocks, counted from `block_ref`.
    pub expiration: u32,
    /// The operations. Exactly one in the grading flow, but the wire format
    /// takes a list.
    pub clauses: Vec<Clause>,
    /// Priority fee coefficient, 0–255. Zero = base gas price.
    pub gas_price_coef: u8,
    /// Gas limit for the whole transaction.
    pub gas: u64,
    /// Optional id of a transaction that must be included first.
    pub depends_on: Option<TxId>,
    /// Uniqueness value. Two bodies differing only in nonce have different
    /// signing hashes, which is the whole point — see
    /// [`crate::submit::NonceSource`].
    pub nonce: u64,
}

impl TransactionBody {
    /// The RLP encoding of the unsigned body: the field list without a
    /// signature, `reserved` encoded as an empty list per the wire format.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        rlp::list(&self.encode_fields())
    }

    /// Concatenated RLP field items, shared between the unsigned encoding
    /// and the signed encoding (which appends the signature item).
    pub(super) fn encode_fields(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(128);
        payload.extend_from_slice(&rlp::uint(u128::from(self.chain_tag)));
        payload.extend_from_slice(&rlp::uint(u128::from(self.block_ref.as_u64())));
        payload.extend_from_slice(&rlp::uint(u128::from(self.expiration)));

        let mut clauses = Vec::new();
        for clause in &self.clauses {
            let mut item = Vec::new();
            item.extend_from_slice(&rlp::bytes(clause.to.as_bytes()));
            item.extend_from_slice(&rlp::uint(clause.value));
            item.extend_from_slice(&rlp::bytes(&clause.data));
            clauses.extend_from_slice(&rlp::list(&item));
        }
        payload.extend_from_slice(&rlp::list(&clauses));

        payload.extend_from_slice(&rlp::uint(u128::from(self.gas_price_coef)));
        payload.extend_from_slice(&rlp::uint(u128::from(self.gas)));
        match &self.depends_on {
            Some(id) => payload.extend_from_slice(&rlp::bytes(id.as_bytes())),
            None => payload.extend_from_slice(&rlp::bytes(&[])),
        }
        payload.extend_from_slice(&rlp::uint(u128::from(self.nonce)));
        // Reserved: empty list until the protocol says otherwise.
        payload.extend_from_slice(&rlp::list(&[]));
        payload
    }

    /// The digest the registrar key signs:
    /// `blake2b256(rlp(unsigned body))`. Deterministic for identical field
    /// values.
    pub fn signing_hash(&self) -> [u8; 32] {
        blake2b256(&self.encode_unsigned())
    }
}

/// Fluent builder for [`TransactionBody`].
///
/// Defaults come from [`crate::config`]: 32-block expiration, 200k gas,
/// zero priority fee. The chain tag, block reference, and nonce have no
/// sensible defaults and must be set explicitly.
///
/// # Usage
///
/// ```rust,no_run
/// use merit_chain::transaction::{BlockRef, Clause, TransactionBuilder};
/// use merit_chain::config::CHAIN_TAG_TESTNET;
///
/// let body = TransactionBuilder::new(CHAIN_TAG_TESTNET)
///     .block_ref(BlockRef::from_bytes([0; 8]))
///     .clause(Clause::call("0xcb0e9d8e05b70f9ed499398911a289570a9ccf24".parse().unwrap(), vec![]))
///     .nonce(1_727_000_000_000)
///     .build();
/// ```
pub struct TransactionBuilder {
    chain_tag: u8,
    block_ref: BlockRef,
    expiration: u32,
    clauses: Vec<Clause>,
    gas_price_coef: u8,
    gas: u64,
    depends_on: Option<TxId>,
    nonce: u64,
}

impl TransactionBuilder {
    /// Creates a builder for the given network's chain tag.
    pub fn new(chain_tag: u8) -> Self {
        Self {
            chain_tag,
            block_ref: BlockRef::from_bytes([0u8; 8]),
            expiration: TX_EXPIRATION_BLOCKS,
            clauses: Vec::new(),
            gas_price_coef: TX_GAS_PRICE_COEF,
            gas: TX_GAS_LIMIT,
            depends_on: None,
            nonce: 0,
        }
    }

    /// Pins the transaction to a recent block.
    pub fn block_ref(mut self, block_ref: BlockRef) -> Self {
        self.block_ref = block_ref;
        self
    }

    /// Overrides the inclusion window (blocks past `block_ref`).
    pub fn expiration(mut self, blocks: u32) -> Self {
        self.expiration = blocks;
        self
    }

    /// Appends a clause.
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Overrides the gas limit.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Overrides the gas price coefficient.
    pub fn gas_price_coef(mut self, coef: u8) -> Self {
        self.gas_price_coef = coef;
        self
    }

    /// Requires another transaction to be included first.
    pub fn depends_on(mut self, id: TxId) -> Self {
        self.depends_on = Some(id);
        self
    }

    /// Sets the uniqueness nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Consumes the builder and produces an unsigned [`TransactionBody`].
    pub fn build(self) -> TransactionBody {
        TransactionBody {
            chain_tag: self.chain_tag,
            block_ref: self.block_ref,
            expiration: self.expiration,
            clauses: self.clauses,
            gas_price_coef: self.gas_price_coef,
            gas: self.gas,
            depends_on: self.depends_on,
            nonce: self.nonce,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
