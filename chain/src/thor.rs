//! # Thor Node Client
//!
//! The network boundary. A remote Thor node is an opaque external
//! collaborator reachable over HTTPS, and this module talks to exactly the
//! three endpoints the submission flow needs:
//!
//! | Method | Path                          | Purpose                      |
//! |--------|-------------------------------|------------------------------|
//! | GET    | `/blocks/best`                | Current best block           |
//! | POST   | `/transactions`               | Broadcast a signed tx        |
//! | GET    | `/transactions/{id}/receipt`  | Receipt, once included       |
//!
//! The request/response shapes are the node's API, not ours — we model the
//! fields we consume and pass the rest through.
//!
//! The client sits behind the [`ThorNode`] trait so the submitter takes it
//! as an injected dependency and tests can substitute a scripted fake. No
//! module-level singletons; construct one, share it with `Arc`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NODE_REQUEST_TIMEOUT;
use crate::transaction::{Receipt, TxId};

/// Errors from talking to the node.
#[derive(Debug, Error)]
pub enum ThorError {
    /// The request never completed: DNS, TLS, connect, or timeout.
    #[error("node transport failure: {0}")]
    Transport(String),

    /// The node answered with a non-success status. For the broadcast
    /// endpoint this is how "malformed body" and "insufficient energy"
    /// arrive.
    #[error("node rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The node answered 2xx but the body wasn't what the API promises.
    #[error("unexpected response from node: {0}")]
    BadResponse(String),
}

/// Summary of a block as reported by `GET /blocks/best`.
///
/// The node reports many more fields; the submission flow only reads the
/// id (for the block reference) and number/timestamp (for diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSummary {
    /// 32-byte block id, `0x`-prefixed hex. Its first 8 bytes become the
    /// transaction's `blockRef`.
    pub id: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub timestamp: u64,
}

/// Body of `POST /transactions`.
#[derive(Debug, Serialize)]
struct BroadcastRequest<'a> {
    raw: &'a str,
}

/// Response of `POST /transactions`.
#[derive(Debug, Deserialize)]
struct BroadcastResponse {
    id: TxId,
}

/// The three node operations the submission flow depends on.
///
/// Implementations must be cheap to share (`Arc<dyn ThorNode>`); the
/// production implementation is [`HttpThorNode`], tests use in-memory
/// fakes.
#[async_trait]
pub trait ThorNode: Send + Sync {
    /// Fetches the chain's current best block.
    async fn best_block(&self) -> Result<BlockSummary, ThorError>;

    /// Broadcasts a signed transaction (hex wire encoding) and returns the
    /// id the node acknowledges. Acceptance, not inclusion.
    async fn send_transaction(&self, raw_hex: &str) -> Result<TxId, ThorError>;

    /// Fetches the receipt for a transaction, or `None` while the
    /// transaction is not (yet) included in a block.
    async fn transaction_receipt(&self, id: &TxId) -> Result<Option<Receipt>, ThorError>;
}

/// HTTP implementation of [`ThorNode`] backed by a reusable
/// [`reqwest::Client`].
pub struct HttpThorNode {
    base_url: String,
    client: reqwest::Client,
}

impl HttpThorNode {
    /// Creates a client for the node at `base_url` (trailing slashes are
    /// tolerated and stripped).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// The node endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Maps a non-success response into [`ThorError::Rejected`], keeping
    /// the node's plain-text explanation (Thor error bodies are prose, not
    /// JSON).
    async fn reject(response: reqwest::Response) -> ThorError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string())
            .trim()
            .to_string();
        ThorError::Rejected { status, message }
    }
}

#[async_trait]
impl ThorNode for HttpThorNode {
    async fn best_block(&self) -> Result<BlockSummary, ThorError> {
        let url = format!("{}/blocks/best", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(NODE_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ThorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        response
            .json::<BlockSummary>()
            .await
            .map_err(|e| ThorError::BadResponse(e.to_string()))
    }

    async fn send_transaction(&self, raw_hex: &str) -> Result<TxId, ThorError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(NODE_REQUEST_TIMEOUT)
            .json(&BroadcastRequest { raw: raw_hex })
            .send()
            .await
            .map_err(|e| ThorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        response
            .json::<BroadcastResponse>()
            .await
            .map(|r| r.id)
            .map_err(|e| ThorError::BadResponse(e.to_string()))
    }

    async fn transaction_receipt(&self, id: &TxId) -> Result<Option<Receipt>, ThorError> {
        let url = format!("{}/transactions/{}/receipt", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .timeout(NODE_REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ThorError::Transport(e.to_string()))?;

        // Thor reports a pending transaction as a 200 with a literal
        // `null` body; some gateways turn it into a 404. Both mean
        // "not included yet", not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        response
            .json::<Option<Receipt>>()
            .await
            .map_err(|e| ThorError::BadResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let node = HttpThorNode::new("https://testnet.vechain.org/");
        assert_eq!(node.base_url(), "https://testnet.vechain.org");
        let node = HttpThorNode::new("https://testnet.vechain.org");
        assert_eq!(node.base_url(), "https://testnet.vechain.org");
    }

    #[test]
    fn block_summary_parses_node_shape() {
        let json = r#"{
            "number": 21253583,
            "id": "0x01444c4fb1ba2bb399f5b2623cc33b2c20bc1c0a9a4e9c4a6c2e3a9f5b2623cc",
            "size": 361,
            "parentID": "0x01444c4eb1ba2bb399f5b2623cc33b2c20bc1c0a9a4e9c4a6c2e3a9f5b2623cc",
            "timestamp": 1727000000
        }"#;
        let block: BlockSummary = serde_json::from_str(json).unwrap();
        assert_eq!(block.number, 21253583);
        assert!(block.id.starts_with("0x01444c4f"));
    }

    #[test]
    fn broadcast_response_parses_id() {
        let json = r#"{"id": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"}"#;
        let parsed: BroadcastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, TxId::from_bytes([0x5a; 32]));
    }

    #[test]
    fn null_receipt_body_means_pending() {
        let parsed: Option<Receipt> = serde_json::from_str("null").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn broadcast_request_wire_shape() {
        let body = serde_json::to_string(&BroadcastRequest { raw: "0xf86a" }).unwrap();
        assert_eq!(body, r#"{"raw":"0xf86a"}"#);
    }
}
