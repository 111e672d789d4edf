//! # Transaction Submission
//!
//! The sequence this crate exists for: build a single-clause transaction
//! against the grading contract, sign it with the registrar key, broadcast
//! it, and wait — bounded — for the network to say what happened.
//!
//! One call, one broadcast, one definite answer. The submitter never
//! retries on its own: a reverted call is a contract decision, and a timed
//! out call *may still land* — resubmitting blindly would risk grading the
//! same student twice. Retry policy belongs to the caller, who knows
//! whether the contract call is idempotent.
//!
//! Authorization is not checked here. The registrar key signs; the
//! contract decides on-chain whether that signer may grade. Keeping that
//! split explicit is the boundary contract of this module.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::abi::{AbiError, Function, Token};
use crate::config::{CONFIRMATION_POLL_INTERVAL, CONFIRMATION_TIMEOUT};
use crate::crypto::{Address, KeyError, RegistrarKeypair};
use crate::thor::{ThorError, ThorNode};
use crate::transaction::{
    sign_transaction, BlockRef, BlockRefError, Clause, Receipt, TransactionBuilder, TxId,
};

/// Terminal failure classes of a submission.
///
/// Three distinct terminal states besides success, because callers must
/// react differently to each:
///
/// - [`Broadcast`](SubmitError::Broadcast) — the node refused the signed
///   transaction up front. Nothing is on-chain; safe to fix and resend.
/// - [`Reverted`](SubmitError::Reverted) — the transaction is on-chain and
///   the contract said no. Not a network failure; do not retry as one.
/// - [`Timeout`](SubmitError::Timeout) — no receipt within the bound. The
///   transaction may still be pending or dropped; the caller cannot assume
///   failure and must not resubmit blindly.
///
/// Everything else (best-block fetch, encoding, signing, unexpected client
/// errors) surfaces with its original message but without a dedicated
/// recovery story.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Node rejected the signed transaction before inclusion (malformed
    /// body, insufficient energy for gas, ...).
    #[error("broadcast rejected: {0}")]
    Broadcast(#[source] ThorError),

    /// Included but execution reverted. Gas was consumed; state was not
    /// changed.
    #[error("transaction {tx_id} reverted on-chain")]
    Reverted { tx_id: TxId, receipt: Box<Receipt> },

    /// No receipt within the confirmation bound. NOT equivalent to
    /// failure — the transaction may still land.
    #[error("no receipt for {tx_id} within {waited:?}; transaction may still be pending")]
    Timeout { tx_id: TxId, waited: Duration },

    /// Any other node interaction failure, surfaced with the original
    /// message.
    #[error("node interaction failed: {0}")]
    Node(#[from] ThorError),

    #[error("call encoding failed: {0}")]
    Encode(#[from] AbiError),

    #[error("block reference derivation failed: {0}")]
    BlockRef(#[from] BlockRefError),

    #[error("signing failed: {0}")]
    Sign(#[from] KeyError),
}

impl SubmitError {
    /// `true` for the timeout class — the one outcome where the caller
    /// must treat the chain state as unknown.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SubmitError::Timeout { .. })
    }

    /// `true` when the transaction landed but the contract reverted it.
    pub fn is_reverted(&self) -> bool {
        matches!(self, SubmitError::Reverted { .. })
    }

    /// The transaction id, for the classes where one exists (the
    /// transaction made it past broadcast).
    pub fn tx_id(&self) -> Option<TxId> {
        match self {
            SubmitError::Reverted { tx_id, .. } | SubmitError::Timeout { tx_id, .. } => {
                Some(*tx_id)
            }
            _ => None,
        }
    }
}

/// How long and how often to poll for a receipt after broadcast.
///
/// One policy, one code path. The bound is a timeout on *observing* the
/// receipt, not on the transaction existing — see
/// [`SubmitError::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Overall bound on the wait.
    pub timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: CONFIRMATION_TIMEOUT,
            poll_interval: CONFIRMATION_POLL_INTERVAL,
        }
    }
}

/// Process-wide distinct nonce values.
///
/// The wire nonce exists only to make otherwise-identical bodies hash
/// differently. Wall-clock milliseconds are the obvious source, but two
/// calls in the same millisecond would collide — so the source returns
/// `max(now_ms, previous + 1)`, which is monotonically distinct across
/// calls for the lifetime of the process.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next nonce: the current wall clock in milliseconds, or
    /// one past the previously issued value, whichever is larger.
    pub fn next(&self) -> u64 {
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now_ms.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        now_ms.max(prev + 1)
    }
}

/// A confirmed, non-reverted submission.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub tx_id: TxId,
    pub receipt: Receipt,
}

/// Builds, signs, broadcasts, and confirms single-clause contract calls.
///
/// The node client is an injected dependency — construct it once, share it
/// with `Arc`, and hand tests a fake. The submitter holds the only copy of
/// the registrar keypair and never exposes it.
///
/// Concurrent `submit` calls on one submitter are serialized by an internal
/// lock: submissions share a signing key, and interleaving them buys
/// nothing while inviting nonce-adjacent confusion in logs and on the node.
pub struct TransactionSubmitter {
    node: Arc<dyn ThorNode>,
    keypair: RegistrarKeypair,
    chain_tag: u8,
    policy: ConfirmationPolicy,
    nonces: NonceSource,
    submission_lock: Mutex<()>,
}

impl TransactionSubmitter {
    /// Creates a submitter for the given network with the default
    /// confirmation policy.
    pub fn new(node: Arc<dyn ThorNode>, keypair: RegistrarKeypair, chain_tag: u8) -> Self {
        Self {
            node,
            keypair,
            chain_tag,
            policy: ConfirmationPolicy::default(),
            nonces: NonceSource::new(),
            submission_lock: Mutex::new(()),
        }
    }

    /// Overrides the confirmation polling policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The address this submitter signs as. Diagnostic only — the contract
    /// recovers and checks the signer on-chain.
    pub fn signer_address(&self) -> Address {
        self.keypair.address()
    }

    /// Performs one authorize-and-call operation against the contract:
    /// encode, build, sign, broadcast, await receipt, classify.
    ///
    /// Exactly one state-changing broadcast per call. See [`SubmitError`]
    /// for the outcome taxonomy.
    pub async fn submit(
        &self,
        contract: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Confirmation, SubmitError> {
        // Serialize submissions sharing this signing key.
        let _guard = self.submission_lock.lock().await;

        let signer = self.keypair.address();
        tracing::debug!(%signer, %contract, function = %function.signature(), "submitting call");

        let best = self.node.best_block().await?;
        let block_ref = BlockRef::from_block_id(&best.id)?;
        tracing::debug!(block = best.number, %block_ref, "pinned to best block");

        let call_data = function.encode_call(args)?;
        let clause = Clause::call(contract, call_data);
        tracing::debug!(to = %clause.to, data_len = clause.data.len(), "clause built");

        let body = TransactionBuilder::new(self.chain_tag)
            .block_ref(block_ref)
            .clause(clause)
            .nonce(self.nonces.next())
            .build();

        let signed = sign_transaction(body, &self.keypair)?;
        let local_id = signed.id();

        let tx_id = self
            .node
            .send_transaction(&signed.encode_hex())
            .await
            .map_err(SubmitError::Broadcast)?;
        if tx_id != local_id {
            // The node acknowledged a different id than we derived. That
            // means our encoding and the node's disagree — worth a loud
            // log, but the node's id is the one receipts are filed under.
            tracing::warn!(%local_id, node_id = %tx_id, "node reported unexpected tx id");
        }
        tracing::info!(%tx_id, "transaction broadcast");

        let receipt = self.await_receipt(&tx_id).await?;
        if receipt.reverted {
            tracing::warn!(%tx_id, "transaction reverted on-chain");
            return Err(SubmitError::Reverted {
                tx_id,
                receipt: Box::new(receipt),
            });
        }
        tracing::info!(%tx_id, gas_used = receipt.gas_used, "transaction confirmed");
        Ok(Confirmation { tx_id, receipt })
    }

    /// Convenience for the one call the grading flow makes:
    /// `gradeSubmission(student, approved)`.
    pub async fn submit_grade(
        &self,
        contract: Address,
        student: Address,
        approved: bool,
    ) -> Result<Confirmation, SubmitError> {
        self.submit(
            contract,
            &Function::grade_submission(),
            &[Token::Address(student), Token::Bool(approved)],
        )
        .await
    }

    /// Polls for the receipt until the policy's timeout elapses.
    ///
    /// Individual poll errors are tolerated and logged — a node hiccup
    /// mid-wait must not turn a pending transaction into a reported
    /// failure. Only the deadline terminates the wait.
    async fn await_receipt(&self, tx_id: &TxId) -> Result<Receipt, SubmitError> {
        let started = Instant::now();
        loop {
            match self.node.transaction_receipt(tx_id).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {
                    tracing::trace!(%tx_id, "no receipt yet");
                }
                Err(e) => {
                    tracing::debug!(%tx_id, error = %e, "receipt poll failed; will retry");
                }
            }

            if started.elapsed() + self.policy.poll_interval > self.policy.timeout {
                return Err(SubmitError::Timeout {
                    tx_id: *tx_id,
                    waited: started.elapsed(),
                });
            }
            tokio::time::sleep(self.policy.poll_interval).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
