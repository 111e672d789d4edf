//! # REST API
//!
//! Builds the axum router that exposes the registrar's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                              | Description                     |
//! |--------|-----------------------------------|---------------------------------|
//! | GET    | `/health`                         | Liveness probe                  |
//! | GET    | `/status`                         | Registrar + chain status        |
//! | POST   | `/submissions/:address/grade`     | Grade one student submission    |

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use merit_chain::crypto::Address;
use merit_chain::submit::{SubmitError, TransactionSubmitter};
use merit_chain::thor::ThorNode;
use merit_chain::transaction::Receipt;

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The service's reported version string.
    pub version: String,
    /// Network identifier ("testnet" or "mainnet").
    pub network: String,
    /// Address of the deployed Learn2Earn contract.
    pub contract: Address,
    /// The submitter owning the registrar key and confirmation policy.
    pub submitter: Arc<TransactionSubmitter>,
    /// Node handle for status queries (the submitter holds its own copy).
    pub node: Arc<dyn ThorNode>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured API port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/submissions/:address/grade", post(grade_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Request body for `POST /submissions/:address/grade`.
#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    /// `true` approves the submission; `false` rejects it. Both verdicts
    /// go on-chain — a rejection is a recorded decision, not a no-op.
    pub approved: bool,
}

/// Response payload for a grade that reached a terminal state.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponse {
    /// Whether the grade was confirmed on-chain without reverting.
    pub success: bool,
    /// Transaction id, present whenever the transaction was broadcast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    /// The on-chain receipt, present on confirmation and reversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    /// Error description for non-success outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Service software version.
    pub version: String,
    /// Network identifier.
    pub network: String,
    /// Address the registrar signs as.
    pub signer: String,
    /// Address of the grading contract.
    pub contract: String,
    /// Best block number reported by the node, if reachable.
    pub best_block: Option<u64>,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the service is alive.
///
/// This is the liveness probe for orchestrators. It intentionally does not
/// contact the node — that belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — returns registrar configuration and chain reachability.
///
/// `best_block` is `null` when the node cannot be reached; the endpoint
/// itself still answers 200 so that probes distinguish "service down" from
/// "node down".
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let best_block = match state.node.best_block().await {
        Ok(block) => Some(block.number),
        Err(e) => {
            tracing::warn!(error = %e, "status: node unreachable");
            None
        }
    };

    let resp = StatusResponse {
        version: state.version.clone(),
        network: state.network.clone(),
        signer: state.submitter.signer_address().to_string(),
        contract: state.contract.to_string(),
        best_block,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Json(resp)
}

/// `POST /submissions/:address/grade` — grades one student submission.
///
/// Blocks until the submission reaches a terminal state, so a successful
/// response means the grade is actually on-chain — typically one or two
/// block intervals, bounded by the confirmation policy.
///
/// Status codes map the outcome taxonomy:
/// - `200` confirmed on-chain
/// - `400` malformed student address
/// - `409` the contract reverted the grade (already graded, unknown
///   student, unauthorized signer)
/// - `502` the node rejected the broadcast or was unreachable
/// - `504` no receipt within the confirmation bound; the transaction may
///   still land, so the caller must check before resubmitting
async fn grade_handler(
    Path(address): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<GradeRequest>,
) -> impl IntoResponse {
    let student: Address = match address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            let err = ErrorResponse {
                error: format!("invalid student address: {}", e),
            };
            return (StatusCode::BAD_REQUEST, Json(serde_json::to_value(err).unwrap_or_default()))
                .into_response();
        }
    };

    tracing::info!(%student, approved = req.approved, "grading submission");
    let timer = state.metrics.grade_latency_seconds.start_timer();
    let outcome = state
        .submitter
        .submit_grade(state.contract, student, req.approved)
        .await;
    timer.observe_duration();
    state.metrics.record_outcome(&outcome);

    let (status, resp) = match outcome {
        Ok(confirmation) => (
            StatusCode::OK,
            GradeResponse {
                success: true,
                tx_id: Some(confirmation.tx_id.to_string()),
                receipt: Some(confirmation.receipt),
                error: None,
            },
        ),
        Err(SubmitError::Reverted { tx_id, receipt }) => (
            StatusCode::CONFLICT,
            GradeResponse {
                success: false,
                tx_id: Some(tx_id.to_string()),
                receipt: Some(*receipt),
                error: Some("transaction reverted on-chain".into()),
            },
        ),
        Err(err @ SubmitError::Timeout { .. }) => (
            StatusCode::GATEWAY_TIMEOUT,
            GradeResponse {
                success: false,
                tx_id: err.tx_id().map(|id| id.to_string()),
                receipt: None,
                error: Some(err.to_string()),
            },
        ),
        Err(err @ (SubmitError::Broadcast(_) | SubmitError::Node(_))) => (
            StatusCode::BAD_GATEWAY,
            GradeResponse {
                success: false,
                tx_id: None,
                receipt: None,
                error: Some(err.to_string()),
            },
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            GradeResponse {
                success: false,
                tx_id: None,
                receipt: None,
                error: Some(err.to_string()),
            },
        ),
    };

    (status, Json(serde_json::to_value(resp).unwrap_or_default())).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
