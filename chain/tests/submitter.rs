//! End-to-end submission tests against a scripted in-memory node.
//!
//! The real node is a remote HTTPS service; these tests substitute a fake
//! that replays a fixed sequence of poll responses, which lets us exercise
//! every terminal state of the submitter — confirmation, reversion,
//! timeout, broadcast rejection — without a network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use merit_chain::config::CHAIN_TAG_TESTNET;
use merit_chain::crypto::{Address, RegistrarKeypair};
use merit_chain::submit::{ConfirmationPolicy, SubmitError, TransactionSubmitter};
use merit_chain::thor::{BlockSummary, ThorError, ThorNode};
use merit_chain::transaction::{Receipt, TxId};

const BEST_BLOCK_ID: &str = "0x01444c4fb1ba2bb399f5b2623cc33b2c20bc1c0a9a4e9c4a6c2e3a9f5b2623cc";

fn contract() -> Address {
    "0xcb0e9d8e05b70f9ed499398911a289570a9ccf24".parse().unwrap()
}

fn student() -> Address {
    "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed".parse().unwrap()
}

fn receipt(reverted: bool) -> Receipt {
    Receipt {
        reverted,
        gas_used: 52_852,
        gas_payer: None,
        paid: None,
        reward: None,
        meta: None,
        outputs: serde_json::Value::Array(Vec::new()),
    }
}

/// One scripted answer to a receipt poll.
enum Poll {
    Pending,
    Found(Receipt),
    Fail,
}

/// A fake node that records broadcasts and replays scripted poll answers.
/// Once the script runs out it keeps answering "pending".
struct FakeNode {
    best_block: Result<BlockSummary, ()>,
    reject_broadcast: bool,
    broadcasts: Mutex<Vec<String>>,
    polls: Mutex<VecDeque<Poll>>,
    poll_count: Mutex<usize>,
}

impl FakeNode {
    fn healthy(polls: Vec<Poll>) -> Self {
        Self {
            best_block: Ok(BlockSummary {
                id: BEST_BLOCK_ID.to_string(),
                number: 21_253_583,
                timestamp: 1_727_000_000,
            }),
            reject_broadcast: false,
            broadcasts: Mutex::new(Vec::new()),
            polls: Mutex::new(polls.into()),
            poll_count: Mutex::new(0),
        }
    }

    async fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().await.len()
    }
}

#[async_trait]
impl ThorNode for FakeNode {
    async fn best_block(&self) -> Result<BlockSummary, ThorError> {
        self.best_block.clone().map_err(|_| ThorError::Transport("connection refused".into()))
    }

    async fn send_transaction(&self, raw_hex: &str) -> Result<TxId, ThorError> {
        if self.reject_broadcast {
            return Err(ThorError::Rejected {
                status: 400,
                message: "insufficient energy".into(),
            });
        }
        self.broadcasts.lock().await.push(raw_hex.to_string());
        Ok(TxId::from_bytes([0xaa; 32]))
    }

    async fn transaction_receipt(&self, _id: &TxId) -> Result<Option<Receipt>, ThorError> {
        *self.poll_count.lock().await += 1;
        match self.polls.lock().await.pop_front() {
            Some(Poll::Pending) | None => Ok(None),
            Some(Poll::Found(r)) => Ok(Some(r)),
            Some(Poll::Fail) => Err(ThorError::Transport("read timed out".into())),
        }
    }
}

/// Fast polling so tests finish in tens of milliseconds, not minutes.
fn fast_policy() -> ConfirmationPolicy {
    ConfirmationPolicy {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
    }
}

fn submitter(node: Arc<FakeNode>) -> TransactionSubmitter {
    TransactionSubmitter::new(node, RegistrarKeypair::generate(), CHAIN_TAG_TESTNET)
        .with_policy(fast_policy())
}

#[tokio::test]
async fn grade_confirms_after_a_few_polls() {
    let node = Arc::new(FakeNode::healthy(vec![
        Poll::Pending,
        Poll::Pending,
        Poll::Found(receipt(false)),
    ]));
    let sub = submitter(Arc::clone(&node));

    let confirmation = sub.submit_grade(contract(), student(), true).await.unwrap();

    assert_eq!(confirmation.tx_id, TxId::from_bytes([0xaa; 32]));
    assert!(!confirmation.receipt.reverted);
    assert_eq!(node.broadcast_count().await, 1, "exactly one broadcast per call");
    assert_eq!(*node.poll_count.lock().await, 3);
}

#[tokio::test]
async fn reversion_is_reported_with_the_tx_id() {
    let node = Arc::new(FakeNode::healthy(vec![Poll::Found(receipt(true))]));
    let sub = submitter(Arc::clone(&node));

    let err = sub.submit_grade(contract(), student(), true).await.unwrap_err();

    assert!(err.is_reverted(), "reversion must never look like success");
    assert!(!err.is_timeout(), "reversion is not a retryable network failure");
    assert_eq!(err.tx_id(), Some(TxId::from_bytes([0xaa; 32])));
}

#[tokio::test]
async fn missing_receipt_times_out_without_resubmission() {
    let node = Arc::new(FakeNode::healthy(Vec::new())); // forever pending
    let sub = submitter(Arc::clone(&node));

    let err = sub.submit_grade(contract(), student(), false).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(!err.is_reverted());
    assert_eq!(err.tx_id(), Some(TxId::from_bytes([0xaa; 32])));
    assert_eq!(
        node.broadcast_count().await,
        1,
        "a timeout must not trigger an automatic resubmission"
    );
    assert!(*node.poll_count.lock().await >= 2, "should have kept polling to the deadline");
}

#[tokio::test]
async fn broadcast_rejection_is_its_own_class() {
    let mut node = FakeNode::healthy(Vec::new());
    node.reject_broadcast = true;
    let node = Arc::new(node);
    let sub = submitter(Arc::clone(&node));

    let err = sub.submit_grade(contract(), student(), true).await.unwrap_err();

    assert!(matches!(err, SubmitError::Broadcast(_)));
    assert!(err.tx_id().is_none(), "nothing reached the chain");
    assert_eq!(*node.poll_count.lock().await, 0, "no point polling for a rejected tx");
}

#[tokio::test]
async fn transient_poll_failures_do_not_kill_the_wait() {
    let node = Arc::new(FakeNode::healthy(vec![
        Poll::Fail,
        Poll::Fail,
        Poll::Found(receipt(false)),
    ]));
    let sub = submitter(Arc::clone(&node));

    let confirmation = sub.submit_grade(contract(), student(), true).await.unwrap();
    assert!(!confirmation.receipt.reverted);
}

#[tokio::test]
async fn best_block_failure_surfaces_before_broadcast() {
    let mut node = FakeNode::healthy(Vec::new());
    node.best_block = Err(());
    let node = Arc::new(node);
    let sub = submitter(Arc::clone(&node));

    let err = sub.submit_grade(contract(), student(), true).await.unwrap_err();

    assert!(matches!(err, SubmitError::Node(_)));
    assert_eq!(node.broadcast_count().await, 0);
}

#[tokio::test]
async fn concurrent_grades_are_serialized_and_distinct() {
    // Two students graded "at the same time" from one key: the internal
    // lock serializes the submissions and the nonce source keeps the
    // signed payloads distinct.
    let node = Arc::new(FakeNode::healthy(vec![
        Poll::Found(receipt(false)),
        Poll::Found(receipt(false)),
    ]));
    let sub = Arc::new(submitter(Arc::clone(&node)));

    let other_student: Address =
        "0x0000000000000000000000000000000000000001".parse().unwrap();

    let a = {
        let sub = Arc::clone(&sub);
        tokio::spawn(async move { sub.submit_grade(contract(), student(), true).await })
    };
    let b = {
        let sub = Arc::clone(&sub);
        tokio::spawn(async move { sub.submit_grade(contract(), other_student, true).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let broadcasts = node.broadcasts.lock().await;
    assert_eq!(broadcasts.len(), 2);
    assert_ne!(broadcasts[0], broadcasts[1], "signed payloads must differ");
}

#[tokio::test]
async fn rejection_by_contract_and_approval_encode_differently() {
    // Same student, opposite verdicts — the broadcast payloads must
    // differ in more than the nonce. Regression guard for the encoder
    // wiring: an approved=false grade silently encoded as approved=true
    // would be the worst bug this system could have.
    let node = Arc::new(FakeNode::healthy(vec![
        Poll::Found(receipt(false)),
        Poll::Found(receipt(false)),
    ]));
    let sub = submitter(Arc::clone(&node));

    sub.submit_grade(contract(), student(), true).await.unwrap();
    sub.submit_grade(contract(), student(), false).await.unwrap();

    let broadcasts = node.broadcasts.lock().await;
    // Hex-decode and compare lengths: identical structure, different bytes.
    let a = hex::decode(broadcasts[0].trim_start_matches("0x")).unwrap();
    let b = hex::decode(broadcasts[1].trim_start_matches("0x")).unwrap();
    assert_eq!(a.len(), b.len());
    assert_ne!(a, b);
}
