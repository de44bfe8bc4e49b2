//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Polkadot operator
#[derive(Parser, Debug)]
#[command(name = "polkadot-operator")]
#[command(version)]
#[command(about = "Reconciles Polkadot validator and sentry StatefulSets")]
#[command(
    long_about = "Drives the StatefulSets of Polkadot custom resources toward their declared role. Runs against an in-memory cluster, which makes every command a safe dry run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the desired StatefulSets of a manifest as YAML
    Render {
        /// Polkadot manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Operator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Reconcile manifests until settled and print the resulting StatefulSets
    Reconcile {
        #[command(flatten)]
        input: Input,

        /// Maximum number of passes
        #[arg(long, default_value_t = 10)]
        max_passes: u32,
    },

    /// Run the reconciliation loop until Ctrl+C
    Run {
        #[command(flatten)]
        input: Input,
    },
}

/// Manifests and configuration shared by the reconciling commands.
#[derive(Args, Debug)]
pub struct Input {
    /// Polkadot manifests (YAML or JSON)
    #[arg(short, long = "manifest", required = true)]
    pub manifests: Vec<PathBuf>,

    /// Operator configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
