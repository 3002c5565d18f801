//! CLI module for AeroHA
//!
//! Provides command-line interface for:
//! - plan: dry-run one reconciliation decision
//! - table: print the whole transition table
//! - check-config: validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{parse_peer, plan_entry, run, run_command, transition_table, PlanEntry};
pub use errors::{CliError, CliErrorCode, CliResult};
