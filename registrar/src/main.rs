// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MERIT Registrar
//!
//! Entry point for the `merit-registrar` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the grading HTTP API.
//!
//! The binary supports three subcommands:
//!
//! - `serve`   — run the registrar HTTP service
//! - `grade`   — grade one submission from the command line and exit
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use merit_chain::crypto::{Address, RegistrarKeypair};
use merit_chain::submit::{SubmitError, TransactionSubmitter};
use merit_chain::thor::{HttpThorNode, ThorNode};

use cli::{ChainArgs, Commands, RegistrarCli};
use logging::LogFormat;
use metrics::RegistrarMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RegistrarCli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Grade(args) => grade_once(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds the chain-facing pieces every subcommand needs: node client,
/// registrar keypair, contract address, submitter.
fn build_submitter(
    chain: &ChainArgs,
) -> Result<(Arc<dyn ThorNode>, Arc<TransactionSubmitter>, Address)> {
    let contract: Address = chain
        .contract_address
        .parse()
        .context("invalid contract address")?;

    let keypair = RegistrarKeypair::from_hex(&chain.registrar_key)
        .context("invalid registrar key (expected 32 bytes of hex)")?;

    let node: Arc<dyn ThorNode> = Arc::new(HttpThorNode::new(&chain.node_url));
    let submitter = Arc::new(TransactionSubmitter::new(
        Arc::clone(&node),
        keypair,
        chain.chain_tag(),
    ));
    Ok((node, submitter, contract))
}

/// Runs the registrar HTTP service: grading API plus metrics endpoint.
async fn serve(args: cli::ServeArgs) -> Result<()> {
    logging::init_logging(
        "merit_registrar=info,merit_chain=info,tower_http=debug",
        args.log_format,
    );

    let network = if args.chain.mainnet { "mainnet" } else { "testnet" };
    tracing::info!(
        api_port = args.api_port,
        metrics_port = args.metrics_port,
        node_url = %args.chain.node_url,
        network,
        "starting merit-registrar"
    );

    let (node, submitter, contract) = build_submitter(&args.chain)?;
    tracing::info!(signer = %submitter.signer_address(), %contract, "registrar identity loaded");

    // --- Metrics ---
    let registrar_metrics = Arc::new(RegistrarMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: network.to_string(),
        contract,
        submitter,
        node,
        metrics: Arc::clone(&registrar_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.api_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&registrar_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("merit-registrar stopped");
    Ok(())
}

/// Grades one submission from the command line and prints the outcome as
/// JSON on stdout. Exits non-zero unless the grade confirmed on-chain.
async fn grade_once(args: cli::GradeArgs) -> Result<()> {
    logging::init_logging("merit_registrar=info,merit_chain=info", LogFormat::Pretty);

    let student: Address = args.student.parse().context("invalid student address")?;
    let (_node, submitter, contract) = build_submitter(&args.chain)?;

    tracing::info!(
        %student,
        approved = args.approve,
        signer = %submitter.signer_address(),
        "grading submission"
    );

    match submitter.submit_grade(contract, student, args.approve).await {
        Ok(confirmation) => {
            println!(
                "{}",
                serde_json::json!({
                    "success": true,
                    "txId": confirmation.tx_id.to_string(),
                    "gasUsed": confirmation.receipt.gas_used,
                })
            );
            Ok(())
        }
        Err(SubmitError::Reverted { tx_id, .. }) => {
            println!(
                "{}",
                serde_json::json!({
                    "success": false,
                    "txId": tx_id.to_string(),
                    "error": "transaction reverted on-chain",
                })
            );
            anyhow::bail!("grade for {student} reverted (tx {tx_id})")
        }
        Err(err) => {
            println!(
                "{}",
                serde_json::json!({
                    "success": false,
                    "txId": err.tx_id().map(|id| id.to_string()),
                    "error": err.to_string(),
                })
            );
            Err(err).context(format!("grade for {student} did not confirm"))
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("merit-registrar {}", env!("CARGO_PKG_VERSION"));
    println!("rustc           {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
