//! Failover Error Types
//!
//! Two categories reach the caller of a reconciliation pass:
//! - `ClusterUnavailable`: the local node stopped serving; keep retrying
//! - `Collaborator`: an opaque failure from a Candidate or Monitor call,
//!   propagated unchanged
//!
//! Bootstrap wraps anything that is not `ClusterUnavailable` into
//! `BootstrapAborted` so the host can choose its restart policy.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Error raised by a collaborator (Candidate, Monitor) implementation.
///
/// The reconciler never inspects it; it only carries it back to the caller.
#[derive(Debug)]
pub struct CollaboratorError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CollaboratorError {
    /// Create a collaborator error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a collaborator error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Get the message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl StdError for CollaboratorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for CollaboratorError {
    fn from(e: std::io::Error) -> Self {
        Self::with_source("I/O failure", e)
    }
}

/// Result type for collaborator calls
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Failover errors
#[derive(Debug, Error)]
pub enum FailoverError {
    /// Neither peer nor witness reachable, or an unsynced backup refused
    /// to self-promote. The local node has been stopped.
    #[error("none of the nodes in the cluster are available")]
    ClusterUnavailable,

    /// A collaborator call failed for a reason other than unreachability.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Bootstrap hit an error it cannot interpret. Fatal for startup.
    #[error("failover bootstrap aborted after {attempts} attempt(s): {source}")]
    BootstrapAborted {
        attempts: u64,
        #[source]
        source: CollaboratorError,
    },
}

impl FailoverError {
    /// Check if this is the ClusterUnavailable condition.
    pub fn is_cluster_unavailable(&self) -> bool {
        matches!(self, Self::ClusterUnavailable)
    }

    /// Check if this error must abort the host's startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BootstrapAborted { .. })
    }

    /// Short machine-readable code for logs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClusterUnavailable => "AERO_HA_CLUSTER_UNAVAILABLE",
            Self::Collaborator(_) => "AERO_HA_COLLABORATOR_FAILED",
            Self::BootstrapAborted { .. } => "AERO_HA_BOOTSTRAP_ABORTED",
        }
    }
}

/// Result type for failover operations
pub type FailoverResult<T> = Result<T, FailoverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_unavailable_not_fatal() {
        let err = FailoverError::ClusterUnavailable;
        assert!(err.is_cluster_unavailable());
        assert!(!err.is_fatal());
        assert_eq!(err.code(), "AERO_HA_CLUSTER_UNAVAILABLE");
    }

    #[test]
    fn test_collaborator_error_is_transparent() {
        let err: FailoverError = CollaboratorError::new("peer query timed out").into();
        assert_eq!(err.to_string(), "peer query timed out");
        assert!(!err.is_cluster_unavailable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_bootstrap_aborted_is_fatal() {
        let err = FailoverError::BootstrapAborted {
            attempts: 3,
            source: CollaboratorError::new("disk gone"),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("3 attempt(s)"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_collaborator_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = CollaboratorError::from(io);
        assert!(err.to_string().contains("refused"));
        assert!(err.source().is_some());
    }
}
