//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroha plan --peer <role|unreachable> --local <role> --cluster-role <role> [--synced]
//! - aeroha table
//! - aeroha check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AeroHA - failover decision core for a two-node plus witness cluster
#[derive(Parser, Debug)]
#[command(name = "aeroha")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the transition a reconciliation pass would take
    Plan {
        /// Peer database role, or "unreachable" if neither peer nor witness answers
        #[arg(long)]
        peer: String,

        /// Local database role
        #[arg(long, default_value = "initialized")]
        local: String,

        /// Local cluster (topology) role
        #[arg(long, default_value = "initialized")]
        cluster_role: String,

        /// Local backup has replayed all data of the previous primary
        #[arg(long)]
        synced: bool,
    },

    /// Print the full transition table as JSON lines
    Table,

    /// Load and validate a configuration file
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroha.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
