//! Transition Planner
//!
//! Maps {peer role, peer reachability, local role, local sync status} onto
//! exactly one `Transition`. The planner has no side effects: it reads
//! local facts lazily, only the ones a branch needs, and returns what the
//! reconciler must do.
//!
//! The table is peer-driven. A node's transition is always a reaction to
//! what the peer currently reports, never an independent claim.

use serde::Serialize;

use super::errors::{CollaboratorResult, FailoverResult};
use super::role::{DbRole, NodeRole};
use super::traits::Candidate;

/// What the reconciler could learn about the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerObservation {
    /// Peer's database role was read, directly or through the witness.
    Reachable(DbRole),
    /// Neither the direct read nor the bounced read succeeded.
    Unreachable,
}

/// Lazily-read facts about the local node.
pub trait LocalFacts {
    fn db_role(&self) -> CollaboratorResult<DbRole>;
    fn cluster_role(&self) -> CollaboratorResult<NodeRole>;
    fn has_synced(&self) -> CollaboratorResult<bool>;
}

/// Live facts backed by the local candidate.
pub struct CandidateFacts<'a>(pub &'a dyn Candidate);

impl LocalFacts for CandidateFacts<'_> {
    fn db_role(&self) -> CollaboratorResult<DbRole> {
        self.0.get_db_role()
    }

    fn cluster_role(&self) -> CollaboratorResult<NodeRole> {
        self.0.get_role()
    }

    fn has_synced(&self) -> CollaboratorResult<bool> {
        self.0.has_synced()
    }
}

/// Fixed facts, used for dry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFacts {
    pub db_role: DbRole,
    pub cluster_role: NodeRole,
    pub synced: bool,
}

impl LocalFacts for StaticFacts {
    fn db_role(&self) -> CollaboratorResult<DbRole> {
        Ok(self.db_role)
    }

    fn cluster_role(&self) -> CollaboratorResult<NodeRole> {
        Ok(self.cluster_role)
    }

    fn has_synced(&self) -> CollaboratorResult<bool> {
        Ok(self.synced)
    }
}

/// The single action a reconciliation pass takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Nothing to do
    Stay,
    /// Set local `active`, perform transition to active
    BecomeActive,
    /// Set local `backup`, perform transition to backup of the peer
    BecomeBackup,
    /// Set local `single`, perform transition to single
    BecomeSingle,
    /// Stop serving and report ClusterUnavailable
    Stop,
}

impl Transition {
    /// Stable name for logs and API responses.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::BecomeActive => "become_active",
            Self::BecomeBackup => "become_backup",
            Self::BecomeSingle => "become_single",
            Self::Stop => "stop",
        }
    }

    /// Database role the local node ends up with, if the transition sets one.
    pub fn target_role(&self) -> Option<DbRole> {
        match self {
            Self::BecomeActive => Some(DbRole::Active),
            Self::BecomeBackup => Some(DbRole::Backup),
            Self::BecomeSingle => Some(DbRole::Single),
            Self::Stay | Self::Stop => None,
        }
    }
}

/// A planned transition with a human-readable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub transition: Transition,
    pub reason: &'static str,
}

impl Decision {
    fn new(transition: Transition, reason: &'static str) -> Self {
        Self { transition, reason }
    }
}

/// Plan the transition for one reconciliation pass.
///
/// Read errors on local facts propagate unchanged, except while the peer is
/// unreachable: there an unreadable local role means the node cannot prove
/// it is `single`, so it stops.
pub fn plan<L: LocalFacts + ?Sized>(peer: PeerObservation, local: &L) -> FailoverResult<Decision> {
    let peer_role = match peer {
        PeerObservation::Reachable(role) => role,
        PeerObservation::Unreachable => {
            return Ok(match local.db_role() {
                Ok(DbRole::Single) => Decision::new(
                    Transition::Stay,
                    "peer and witness unreachable; single node keeps serving",
                ),
                Ok(_) => Decision::new(
                    Transition::Stop,
                    "peer and witness unreachable; non-single node must stop",
                ),
                Err(_) => Decision::new(
                    Transition::Stop,
                    "peer and witness unreachable; local role unreadable",
                ),
            });
        }
    };

    let decision = match peer_role {
        DbRole::Single | DbRole::Active => {
            Decision::new(Transition::BecomeBackup, "peer holds write authority")
        }
        DbRole::Dead => {
            if local.db_role()? == DbRole::Backup && !local.has_synced()? {
                Decision::new(
                    Transition::Stop,
                    "peer dead but local backup has not synced",
                )
            } else {
                Decision::new(Transition::BecomeSingle, "peer dead; taking sole authority")
            }
        }
        DbRole::Initialized => match local.cluster_role()? {
            NodeRole::Primary => Decision::new(
                Transition::BecomeActive,
                "fresh cluster; local is topology primary",
            ),
            NodeRole::Secondary => Decision::new(
                Transition::BecomeBackup,
                "fresh cluster; local is topology secondary",
            ),
            NodeRole::Initialized => Decision::new(
                Transition::Stay,
                "fresh cluster; local topology role not assigned yet",
            ),
        },
        DbRole::Backup => Decision::new(Transition::BecomeActive, "peer is backup"),
    };

    Ok(decision)
}
