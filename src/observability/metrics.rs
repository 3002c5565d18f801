//! Failover metrics
//!
//! - Counters only, monotonic, reset on process start
//! - Relaxed atomics; counters never gate a decision

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters describing reconciler activity.
#[derive(Debug, Default)]
pub struct FailoverMetrics {
    passes: AtomicU64,
    failed_passes: AtomicU64,
    cluster_unavailable: AtomicU64,
    bounces: AtomicU64,
    to_active: AtomicU64,
    to_backup: AtomicU64,
    to_single: AtomicU64,
    stops: AtomicU64,
    promotions: AtomicU64,
    demotions: AtomicU64,
    bootstrap_attempts: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl FailoverMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&self) {
        bump(&self.passes);
    }

    pub fn record_failed_pass(&self) {
        bump(&self.failed_passes);
    }

    pub fn record_cluster_unavailable(&self) {
        bump(&self.cluster_unavailable);
    }

    pub fn record_bounce(&self) {
        bump(&self.bounces);
    }

    pub fn record_to_active(&self) {
        bump(&self.to_active);
    }

    pub fn record_to_backup(&self) {
        bump(&self.to_backup);
    }

    pub fn record_to_single(&self) {
        bump(&self.to_single);
    }

    pub fn record_stop(&self) {
        bump(&self.stops);
    }

    pub fn record_promotion(&self) {
        bump(&self.promotions);
    }

    pub fn record_demotion(&self) {
        bump(&self.demotions);
    }

    pub fn record_bootstrap_attempt(&self) {
        bump(&self.bootstrap_attempts);
    }

    /// Bootstrap attempts so far.
    pub fn bootstrap_attempts(&self) -> u64 {
        self.bootstrap_attempts.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            passes: load(&self.passes),
            failed_passes: load(&self.failed_passes),
            cluster_unavailable: load(&self.cluster_unavailable),
            bounces: load(&self.bounces),
            to_active: load(&self.to_active),
            to_backup: load(&self.to_backup),
            to_single: load(&self.to_single),
            stops: load(&self.stops),
            promotions: load(&self.promotions),
            demotions: load(&self.demotions),
            bootstrap_attempts: load(&self.bootstrap_attempts),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passes: u64,
    pub failed_passes: u64,
    pub cluster_unavailable: u64,
    pub bounces: u64,
    pub to_active: u64,
    pub to_backup: u64,
    pub to_single: u64,
    pub stops: u64,
    pub promotions: u64,
    pub demotions: u64,
    pub bootstrap_attempts: u64,
}
