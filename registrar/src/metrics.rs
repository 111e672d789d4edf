//! # Prometheus Metrics
//!
//! Operational metrics for the registrar service, scraped at the
//! `/metrics` endpoint on the dedicated metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so
//! they do not collide with any default global registry consumers. The
//! counters mirror the submission outcome taxonomy one-to-one: every
//! finished grade increments exactly one of them.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the registrar.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it can
/// be shared across request handlers.
#[derive(Clone)]
pub struct RegistrarMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Grades that landed on-chain and did not revert.
    pub grades_confirmed_total: IntCounter,
    /// Grades that landed on-chain but the contract reverted.
    pub grades_reverted_total: IntCounter,
    /// Grades whose receipt did not appear within the confirmation bound.
    pub grades_timed_out_total: IntCounter,
    /// Grades that failed before or during broadcast (nothing on-chain).
    pub grades_failed_total: IntCounter,
    /// Histogram of end-to-end grade latency in seconds (broadcast through
    /// receipt, or until the terminal error).
    pub grade_latency_seconds: Histogram,
}

impl RegistrarMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("merit".into()), None)
            .expect("failed to create prometheus registry");

        let grades_confirmed_total = IntCounter::new(
            "grades_confirmed_total",
            "Total number of grades confirmed on-chain",
        )
        .expect("metric creation");
        registry
            .register(Box::new(grades_confirmed_total.clone()))
            .expect("metric registration");

        let grades_reverted_total = IntCounter::new(
            "grades_reverted_total",
            "Total number of grades reverted by the contract",
        )
        .expect("metric creation");
        registry
            .register(Box::new(grades_reverted_total.clone()))
            .expect("metric registration");

        let grades_timed_out_total = IntCounter::new(
            "grades_timed_out_total",
            "Total number of grades with no receipt within the confirmation bound",
        )
        .expect("metric creation");
        registry
            .register(Box::new(grades_timed_out_total.clone()))
            .expect("metric registration");

        let grades_failed_total = IntCounter::new(
            "grades_failed_total",
            "Total number of grades that failed before inclusion",
        )
        .expect("metric creation");
        registry
            .register(Box::new(grades_failed_total.clone()))
            .expect("metric registration");

        // Buckets track the ~10s block cadence up to the 60s bound.
        let grade_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "grade_latency_seconds",
                "End-to-end grade submission latency in seconds",
            )
            .buckets(vec![1.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0, 90.0]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(grade_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            grades_confirmed_total,
            grades_reverted_total,
            grades_timed_out_total,
            grades_failed_total,
            grade_latency_seconds,
        }
    }

    /// Increments the counter matching one submission outcome.
    pub fn record_outcome(&self, outcome: &Result<merit_chain::submit::Confirmation, merit_chain::submit::SubmitError>) {
        use merit_chain::submit::SubmitError;
        match outcome {
            Ok(_) => self.grades_confirmed_total.inc(),
            Err(SubmitError::Reverted { .. }) => self.grades_reverted_total.inc(),
            Err(SubmitError::Timeout { .. }) => self.grades_timed_out_total.inc(),
            Err(_) => self.grades_failed_total.inc(),
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for RegistrarMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<RegistrarMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
