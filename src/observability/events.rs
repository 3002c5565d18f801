//! Observable failover events
//!
//! Events are explicit and typed. Each maps to a stable log name and a
//! default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in the failover core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Bootstrap
    /// Reconciler construction begins
    BootstrapBegin,
    /// One bootstrap pass found the cluster unavailable; retrying
    BootstrapRetry,
    /// Bootstrap produced a usable view of the cluster
    BootstrapComplete,
    /// Bootstrap hit an uninterpretable error
    BootstrapAborted,

    // Reconciliation
    /// Direct peer read failed; bouncing through the witness
    PeerBounce,
    /// Neither peer nor witness answered
    PeerUnreachable,
    /// A pass applied a role transition
    Transition,
    /// A pass found nothing to change
    Steady,
    /// The node was told to stop serving
    Stop,
    /// A pass failed with a collaborator error
    RecheckFailed,

    // Manual overrides
    /// Operator promoted the local node
    Promote,
    /// Operator demoted the local node
    Demote,

    // Loop and control plane
    /// Periodic loop started
    LoopStart,
    /// Periodic loop stopped
    LoopStop,
    /// Control plane listening
    ControlServing,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootstrapBegin => "FAILOVER_BOOTSTRAP_BEGIN",
            Event::BootstrapRetry => "FAILOVER_BOOTSTRAP_RETRY",
            Event::BootstrapComplete => "FAILOVER_BOOTSTRAP_COMPLETE",
            Event::BootstrapAborted => "FAILOVER_BOOTSTRAP_ABORTED",
            Event::PeerBounce => "FAILOVER_PEER_BOUNCE",
            Event::PeerUnreachable => "FAILOVER_PEER_UNREACHABLE",
            Event::Transition => "FAILOVER_TRANSITION",
            Event::Steady => "FAILOVER_STEADY",
            Event::Stop => "FAILOVER_STOP",
            Event::RecheckFailed => "FAILOVER_RECHECK_FAILED",
            Event::Promote => "FAILOVER_PROMOTE",
            Event::Demote => "FAILOVER_DEMOTE",
            Event::LoopStart => "FAILOVER_LOOP_START",
            Event::LoopStop => "FAILOVER_LOOP_STOP",
            Event::ControlServing => "FAILOVER_CONTROL_SERVING",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::Steady | Event::PeerBounce => Severity::Trace,
            Event::BootstrapRetry | Event::PeerUnreachable | Event::Stop => Severity::Warn,
            Event::RecheckFailed => Severity::Error,
            Event::BootstrapAborted => Severity::Fatal,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootstrapAborted)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
