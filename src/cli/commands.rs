//! CLI command implementations
//!
//! Commands are offline: they evaluate the planner against fixed facts and
//! never contact a cluster.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::failover::{plan, DbRole, NodeRole, PeerObservation, StaticFacts, Transition};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// One row of planner output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub peer: String,
    pub local: DbRole,
    pub cluster_role: NodeRole,
    pub synced: bool,
    pub transition: Transition,
    pub target_role: Option<DbRole>,
    pub reason: &'static str,
}

/// Entry point used by `main`
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Plan {
            peer,
            local,
            cluster_role,
            synced,
        } => plan_command(&peer, &local, &cluster_role, synced),
        Command::Table => table_command(),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Parse a peer argument: a database role or "unreachable"
pub fn parse_peer(value: &str) -> CliResult<PeerObservation> {
    if value == "unreachable" {
        return Ok(PeerObservation::Unreachable);
    }
    Ok(PeerObservation::Reachable(value.parse()?))
}

/// Evaluate the planner for one combination of facts
pub fn plan_entry(peer: PeerObservation, facts: StaticFacts) -> CliResult<PlanEntry> {
    let decision = plan(peer, &facts)?;
    let peer = match peer {
        PeerObservation::Reachable(role) => role.as_str().to_string(),
        PeerObservation::Unreachable => "unreachable".to_string(),
    };

    Ok(PlanEntry {
        peer,
        local: facts.db_role,
        cluster_role: facts.cluster_role,
        synced: facts.synced,
        transition: decision.transition,
        target_role: decision.transition.target_role(),
        reason: decision.reason,
    })
}

/// Every combination of peer observation and local facts
pub fn transition_table() -> CliResult<Vec<PlanEntry>> {
    let peers = std::iter::once(PeerObservation::Unreachable)
        .chain(DbRole::ALL.into_iter().map(PeerObservation::Reachable));
    let locals = [DbRole::Initialized, DbRole::Single, DbRole::Active, DbRole::Backup];

    let mut entries = Vec::new();
    for peer in peers {
        for db_role in locals {
            for cluster_role in NodeRole::ALL {
                for synced in [true, false] {
                    let facts = StaticFacts {
                        db_role,
                        cluster_role,
                        synced,
                    };
                    entries.push(plan_entry(peer, facts)?);
                }
            }
        }
    }
    Ok(entries)
}

fn plan_command(peer: &str, local: &str, cluster_role: &str, synced: bool) -> CliResult<()> {
    let peer = parse_peer(peer)?;
    let db_role: DbRole = local.parse()?;
    if !db_role.is_assignable() && db_role != DbRole::Initialized {
        return Err(CliError::invalid_argument(format!(
            "local role '{}' is never held by the local node",
            db_role
        )));
    }

    let facts = StaticFacts {
        db_role,
        cluster_role: cluster_role.parse()?,
        synced,
    };
    write_json_line(&plan_entry(peer, facts)?)
}

fn table_command() -> CliResult<()> {
    for entry in transition_table()? {
        write_json_line(&entry)?;
    }
    Ok(())
}

fn check_config(path: &Path) -> CliResult<()> {
    let config = Config::load(path)?;
    write_json_line(&config)
}

fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
