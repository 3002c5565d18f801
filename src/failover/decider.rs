//! Decider: the public surface of the failover core

use std::thread;
use std::time::Duration;

use serde::Serialize;

use super::errors::FailoverResult;
use super::plan::Transition;
use super::role::{DbRole, NodeRole};
use crate::observability::MetricsSnapshot;

/// Operations a host (periodic loop, operator, control plane) drives.
pub trait Decider: Send + Sync {
    /// One reconciliation pass. Returns the transition that was applied.
    fn recheck(&self) -> FailoverResult<Transition>;

    /// Make the local node active without inspecting the peer.
    ///
    /// The caller is responsible for knowing the peer is down.
    fn promote(&self) -> FailoverResult<()>;

    /// Make the local node a backup of the peer without inspecting it.
    fn demote(&self) -> FailoverResult<()>;

    /// Local roles and counters, read under the decision lock.
    fn status(&self) -> DeciderStatus;

    /// Run a pass every `interval`, forever. Errors are discarded; the next
    /// tick retries.
    fn run_loop(&self, interval: Duration) -> ! {
        loop {
            thread::sleep(interval);
            let _ = self.recheck();
        }
    }
}

/// Point-in-time view of the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeciderStatus {
    /// `None` if the local database role could not be read
    pub db_role: Option<DbRole>,
    /// `None` if the local cluster role could not be read
    pub cluster_role: Option<NodeRole>,
    pub metrics: MetricsSnapshot,
}
