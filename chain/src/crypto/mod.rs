//! # Cryptographic Primitives
//!
//! The two things MERIT needs from cryptography and nothing more:
//!
//! - **hash** — blake2b-256 (Thor's transaction hash) and keccak-256
//!   (ABI selectors and address derivation).
//! - **keys** — secp256k1 keypairs with recoverable ECDSA signatures and
//!   Ethereum-style address derivation.
//!
//! Everything here is a thin, audited-crate-backed wrapper. No hand-rolled
//! curve arithmetic, no custom hash constructions.

pub mod hash;
pub mod keys;

pub use hash::{blake2b256, keccak256};
pub use keys::{Address, KeyError, RegistrarKeypair};
