// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MERIT — Core Chain Library
//!
//! MERIT is a learn-to-earn workflow: a student submits proof of task
//! completion, a registrar approves it on-chain, and the student claims a
//! token reward from the contract. This crate is the on-chain half of that
//! story — everything between "the registrar pressed approve" and "the
//! network wrote a receipt".
//!
//! The target network is a VeChain-style ("Thor") chain: secp256k1 keys,
//! blake2b-256 transaction hashes, RLP wire encoding, and a plain REST node
//! API. There is no vendor SDK to lean on in Rust, so the layers one would
//! normally import are implemented here, each small and boring on purpose.
//!
//! ## Architecture
//!
//! - **crypto** — secp256k1 keys, address derivation, and the two hash
//!   functions the chain cares about. Don't roll your own.
//! - **abi** — call-data encoding for a fixed contract function. The encoder
//!   is deterministic; the contract does the interpreting.
//! - **transaction** — clause/body model, RLP encoding, signing, and id
//!   derivation.
//! - **thor** — the HTTP node client. Three operations, nothing else.
//! - **submit** — build, sign, broadcast, wait. The one sequence this crate
//!   exists to get right.
//! - **config** — protocol constants and network parameters.
//!
//! ## Design Philosophy
//!
//! 1. The node is a remote collaborator, not a dependency to mock around —
//!    so it sits behind a trait and tests swap in a fake.
//! 2. Authorization lives in the contract. This crate signs and broadcasts;
//!    it never decides who is allowed to grade.
//! 3. A timed-out confirmation is not a failure. The transaction may still
//!    land. Callers who resubmit blindly get duplicate grades.

pub mod abi;
pub mod config;
pub mod crypto;
pub mod submit;
pub mod thor;
pub mod transaction;
