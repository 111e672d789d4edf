//! # Protocol Configuration & Constants
//!
//! Every magic number in MERIT lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Most of these mirror what the Thor network itself enforces (chain tags,
//! expiration semantics); the rest are operational defaults we chose and
//! defend in DESIGN.md. Change them in one place or not at all.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Chain tag of the Thor mainnet — the last byte of the genesis block id.
/// Baked into every signed transaction so a testnet tx can never replay
/// against mainnet (and vice versa).
pub const CHAIN_TAG_MAINNET: u8 = 0x4a;

/// Chain tag of the Thor testnet, where grading mistakes cost nothing.
pub const CHAIN_TAG_TESTNET: u8 = 0x27;

/// Well-known public node endpoints. Operators can (and should) point the
/// registrar at their own node; these are the fallback for development.
pub const MAINNET_NODE_URL: &str = "https://mainnet.vechain.org";
pub const TESTNET_NODE_URL: &str = "https://testnet.vechain.org";

// ---------------------------------------------------------------------------
// Transaction Parameters
// ---------------------------------------------------------------------------

/// How many blocks past its `blockRef` a transaction stays eligible for
/// inclusion. After this window the network silently drops it — observed by
/// us as a confirmation timeout, not as a typed rejection. 32 blocks at
/// ~10 s each gives the network about five minutes.
pub const TX_EXPIRATION_BLOCKS: u32 = 32;

/// Fixed gas limit for a single grading call. `gradeSubmission` touches one
/// storage slot and emits one event; 200k is generous headroom without
/// risking a surprise bill if the contract misbehaves.
pub const TX_GAS_LIMIT: u64 = 200_000;

/// Gas price coefficient. Zero means "base price, no priority tip" — the
/// grading flow is in no hurry and the registrar pays for every call.
pub const TX_GAS_PRICE_COEF: u8 = 0;

/// Length of a `blockRef` in bytes: the fixed-size prefix taken from the
/// best block's 32-byte id. The truncation length is part of the wire
/// format, not a tunable.
pub const BLOCK_REF_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Confirmation Policy
// ---------------------------------------------------------------------------

/// How long we wait for a receipt after broadcast before giving up and
/// reporting a timeout. Six block intervals of slack on top of the typical
/// one-to-two blocks to inclusion.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);

/// How often we poll the node for a receipt while waiting. Polling faster
/// than the ~10 s block time buys nothing but load on the node; 2 s keeps
/// reported latency snappy once the block lands.
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-request timeout for individual node HTTP calls. Distinct from the
/// confirmation timeout: this bounds one GET/POST, not the whole wait.
pub const NODE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Contract Interface
// ---------------------------------------------------------------------------

/// Name of the grading function on the Learn2Earn contract. The registrar
/// calls `gradeSubmission(address student, bool approved)`; the contract
/// enforces that only the registrar key may do so.
pub const GRADE_FUNCTION_NAME: &str = "gradeSubmission";
