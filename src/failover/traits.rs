//! Collaborator traits
//!
//! The reconciler never talks to a database, a proxy or the network itself.
//! Hosts plug those concerns in through three traits:
//! - `Monitor`: the witness, able to relay to a peer
//! - `Candidate`: one data node (local or peer)
//! - `Performer`: the physical side effects of a transition
//!
//! Calls may block for arbitrary time. Bounding them is the
//! implementation's job; the reconciler holds its lock across them.

use std::sync::Arc;

use super::errors::CollaboratorResult;
use super::role::{DbRole, NodeRole};

/// A cluster member able to report its topology role and relay to a peer.
pub trait Monitor: Send + Sync {
    /// Topology role reported by this member.
    fn get_role(&self) -> CollaboratorResult<NodeRole>;

    /// Re-resolve `peer` through the witness.
    ///
    /// The returned candidate may differ from `peer`; it is only used to
    /// read the peer's database role once.
    fn bounce(&self, peer: &Arc<dyn Candidate>) -> Arc<dyn Candidate>;

    /// Block until this member is usable.
    fn ready(&self);
}

/// A data node participating in failover.
pub trait Candidate: Monitor {
    /// Current failover-layer role.
    fn get_db_role(&self) -> CollaboratorResult<DbRole>;

    /// Assign a failover-layer role. Only the reconciler calls this.
    fn set_db_role(&self, role: DbRole) -> CollaboratorResult<()>;

    /// Whether this node has replayed all data of the previous primary.
    fn has_synced(&self) -> CollaboratorResult<bool>;
}

/// Executes the physical consequences of a transition.
///
/// Fire-and-forget: the reconciler observes no result.
pub trait Performer: Send + Sync {
    fn transition_to_active(&self, me: &dyn Candidate);

    fn transition_to_backup_of(&self, me: &dyn Candidate, other: &dyn Candidate);

    fn transition_to_single(&self, me: &dyn Candidate);

    /// Stop serving entirely.
    fn stop(&self);
}
