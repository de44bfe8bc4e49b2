//! # Polkadot operator
//!
//! Entry point of the `polkadot-operator` binary.
//!
//! ## Commands
//!
//! - `render` prints the StatefulSets a manifest's role asks for
//! - `reconcile` converges manifests against an in-memory cluster, following
//!   forced requeues until every resource settles
//! - `run` keeps reconciling on the configured resync interval until Ctrl+C
//!
//! ## Error Handling
//!
//! Every command returns `anyhow::Result`; failures halt with a message
//! carrying the failing file or step as context.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    commands::execute_command(cli.command).await
}

/// Initialize tracing subscriber with environment filter.
///
/// Logs go to stderr so rendered manifests on stdout stay pipeable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
