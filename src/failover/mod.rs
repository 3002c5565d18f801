//! Failover Subsystem
//!
//! Decision core of a two-node plus witness cluster:
//! - At most one node holds `active` or `single` at any instant
//! - A backup that has not synced never promotes itself to `single`
//! - A node that can see neither peer nor witness stops unless it is
//!   already `single`
//!
//! The core does not inspect databases, reconfigure proxies or contact
//! peers. Those are collaborator concerns, plugged in through
//! `Candidate`, `Monitor` and `Performer`.

mod decider;
mod errors;
mod plan;
mod reconciler;
mod role;
mod traits;

pub use decider::{Decider, DeciderStatus};
pub use errors::{CollaboratorError, CollaboratorResult, FailoverError, FailoverResult};
pub use plan::{plan, CandidateFacts, Decision, LocalFacts, PeerObservation, StaticFacts, Transition};
pub use reconciler::{LoopHandle, Reconciler, ReconcilerOptions};
pub use role::{is_split_brain, DbRole, NodeRole};
pub use traits::{Candidate, Monitor, Performer};
