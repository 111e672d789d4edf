//! # Structured Logging
//!
//! Initializes the `tracing` subscriber for the registrar. Two rules drive
//! the setup here:
//!
//! 1. All log output goes to **stderr**. The `grade` subcommand prints its
//!    outcome object on stdout, and piping that into `jq` must never pick
//!    up a stray log line.
//! 2. The format is an operator decision (`--log-format` / env), parsed by
//!    clap as a [`LogFormat`] rather than a free-form string.
//!
//! Filtering follows `RUST_LOG` when set, falling back to the directives
//! the caller passes in.

use clap::ValueEnum;
use std::fmt;
use tracing_subscriber::EnvFilter;

/// Log output format, selectable via `--log-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable output for local operation.
    Pretty,
    /// JSON lines for production log aggregation.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Call this exactly once, early in `main()`. Subsequent calls will panic.
///
/// `default_directives` applies when `RUST_LOG` is not set, e.g.
/// `"merit_registrar=info,merit_chain=info"`; the environment variable
/// overrides it with standard `EnvFilter` syntax.
pub fn init_logging(default_directives: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    tracing::info!(%format, "logging initialized");
}
