//! # CLI Interface
//!
//! Defines the command-line argument structure for `merit-registrar` using
//! `clap` derive. Supports three subcommands: `serve`, `grade`, and
//! `version`.
//!
//! The chain configuration (node URL, contract address, registrar key) is
//! env-backed on every subcommand that touches the chain, so deployments
//! can configure the service entirely through the environment.

use clap::{Args, Parser, Subcommand};

use crate::logging::LogFormat;

/// MERIT registrar service.
///
/// Holds the registrar key for the Learn2Earn contract and performs
/// on-chain grading: students submit proof of task completion, the
/// registrar approves (or rejects) it here, and approved students claim
/// their token reward from the contract.
#[derive(Parser, Debug)]
#[command(
    name = "merit-registrar",
    about = "MERIT registrar service — grades student submissions on-chain",
    version,
    propagate_version = true
)]
pub struct RegistrarCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the registrar binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the registrar HTTP service.
    Serve(ServeArgs),
    /// Grade one submission from the command line and exit.
    Grade(GradeArgs),
    /// Print version information and exit.
    Version,
}

/// Chain-facing configuration shared by `serve` and `grade`.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Base URL of the Thor node to talk to.
    #[arg(long, env = "MERIT_NODE_URL", default_value = merit_chain::config::TESTNET_NODE_URL)]
    pub node_url: String,

    /// Address of the deployed Learn2Earn contract.
    #[arg(long, env = "MERIT_CONTRACT_ADDRESS")]
    pub contract_address: String,

    /// Hex-encoded secp256k1 registrar private key.
    ///
    /// **Never pass this flag on a shared machine's command line** — use
    /// the environment variable; argv is world-readable.
    #[arg(long, env = "MERIT_REGISTRAR_KEY", hide_env_values = true)]
    pub registrar_key: String,

    /// Grade against mainnet instead of testnet. Changes the chain tag
    /// baked into every transaction; point `--node-url` at a matching node.
    #[arg(long, env = "MERIT_MAINNET", default_value_t = false)]
    pub mainnet: bool,
}

impl ChainArgs {
    /// The chain tag for the selected network.
    pub fn chain_tag(&self) -> u8 {
        if self.mainnet {
            merit_chain::config::CHAIN_TAG_MAINNET
        } else {
            merit_chain::config::CHAIN_TAG_TESTNET
        }
    }
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Port for the HTTP API.
    #[arg(long, env = "MERIT_API_PORT", default_value_t = 8443)]
    pub api_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "MERIT_METRICS_PORT", default_value_t = 8444)]
    pub metrics_port: u16,

    /// Log output format.
    #[arg(long, env = "MERIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Arguments for the `grade` subcommand.
#[derive(Args, Debug)]
pub struct GradeArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Address of the student whose submission is being graded.
    pub student: String,

    /// Approve the submission. Omit to reject it.
    #[arg(long, default_value_t = false)]
    pub approve: bool,
}
