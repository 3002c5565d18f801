//! Cluster and database roles
//!
//! Two independent role vocabularies meet in the failover core:
//! - `NodeRole`: what the replication topology reports (primary/secondary)
//! - `DbRole`: what the failover layer assigns (single/active/backup)
//!
//! Only the reconciler assigns a `DbRole`. `Dead` is observed on a peer,
//! never assigned locally.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::CollaboratorError;

/// Replication-topology role as reported by the underlying database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Node has not joined a replication topology yet
    Initialized,
    /// Node is the topology's designated primary
    Primary,
    /// Node is the topology's designated secondary
    Secondary,
}

impl NodeRole {
    /// All node roles, in declaration order.
    pub const ALL: [NodeRole; 3] = [Self::Initialized, Self::Primary, Self::Secondary];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRole {
    type Err = CollaboratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Self::Initialized),
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            other => Err(CollaboratorError::new(format!(
                "unknown node role: '{}'",
                other
            ))),
        }
    }
}

/// Failover-layer role. Downstream proxies and replication honor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbRole {
    /// Peer has not been assigned a database role yet
    Initialized,
    /// Sole write authority, no backup attached
    Single,
    /// Write authority with a backup following it
    Active,
    /// Follows the active node
    Backup,
    /// Peer reports a terminal or unhealthy state (peer-observed only)
    Dead,
}

impl DbRole {
    /// All database roles, in declaration order.
    pub const ALL: [DbRole; 5] = [
        Self::Initialized,
        Self::Single,
        Self::Active,
        Self::Backup,
        Self::Dead,
    ];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Single => "single",
            Self::Active => "active",
            Self::Backup => "backup",
            Self::Dead => "dead",
        }
    }

    /// Whether a node holding this role accepts writes.
    pub fn is_write_authority(&self) -> bool {
        matches!(self, Self::Single | Self::Active)
    }

    /// Whether the reconciler may assign this role to the local node.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Single | Self::Active | Self::Backup)
    }
}

impl fmt::Display for DbRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbRole {
    type Err = CollaboratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Self::Initialized),
            "single" => Ok(Self::Single),
            "active" => Ok(Self::Active),
            "backup" => Ok(Self::Backup),
            "dead" => Ok(Self::Dead),
            other => Err(CollaboratorError::new(format!(
                "unknown database role: '{}'",
                other
            ))),
        }
    }
}

/// Returns true if two roles together would put two write authorities
/// in the cluster.
pub fn is_split_brain(local: DbRole, peer: DbRole) -> bool {
    local.is_write_authority() && peer.is_write_authority()
}
