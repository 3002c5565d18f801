//! Scripted collaborators shared by the failover integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aeroha::failover::{
    Candidate, CollaboratorError, CollaboratorResult, DbRole, FailoverResult, Monitor, NodeRole,
    Performer, Reconciler, ReconcilerOptions,
};

/// Ordered record of side effects across collaborators.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<&'static str>>,
}

impl Journal {
    pub fn push(&self, entry: &'static str) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.entries.lock().unwrap().clone()
    }
}

/// A candidate whose answers are scripted by the test.
pub struct MockCandidate {
    /// `None` makes every database role read fail
    db_role: Mutex<Option<DbRole>>,
    /// `None` makes every cluster role read fail
    cluster_role: Mutex<Option<NodeRole>>,
    /// `None` makes every sync status read fail
    synced: Mutex<Option<bool>>,
    /// Number of upcoming database role reads that fail regardless
    failing_db_reads: AtomicUsize,
    fail_set: AtomicBool,
    sets: Mutex<Vec<DbRole>>,
    db_reads: AtomicUsize,
    sync_reads: AtomicUsize,
    ready_calls: AtomicUsize,
    read_delay: Duration,
    journal: Option<Arc<Journal>>,
}

impl MockCandidate {
    pub fn new(db_role: DbRole, cluster_role: NodeRole) -> Self {
        Self {
            db_role: Mutex::new(Some(db_role)),
            cluster_role: Mutex::new(Some(cluster_role)),
            synced: Mutex::new(Some(true)),
            failing_db_reads: AtomicUsize::new(0),
            fail_set: AtomicBool::new(false),
            sets: Mutex::new(Vec::new()),
            db_reads: AtomicUsize::new(0),
            sync_reads: AtomicUsize::new(0),
            ready_calls: AtomicUsize::new(0),
            read_delay: Duration::ZERO,
            journal: None,
        }
    }

    /// A candidate that answers no database role read.
    pub fn unreachable() -> Self {
        let candidate = Self::new(DbRole::Initialized, NodeRole::Initialized);
        candidate.script_db_role(None);
        candidate
    }

    pub fn synced(self, synced: bool) -> Self {
        *self.synced.lock().unwrap() = Some(synced);
        self
    }

    pub fn failing_db_reads(self, count: usize) -> Self {
        self.failing_db_reads.store(count, Ordering::SeqCst);
        self
    }

    pub fn read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn journal(mut self, journal: Arc<Journal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn script_db_role(&self, role: Option<DbRole>) {
        *self.db_role.lock().unwrap() = role;
    }

    pub fn script_cluster_role(&self, role: Option<NodeRole>) {
        *self.cluster_role.lock().unwrap() = role;
    }

    pub fn script_synced(&self, synced: Option<bool>) {
        *self.synced.lock().unwrap() = synced;
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn current_db_role(&self) -> Option<DbRole> {
        *self.db_role.lock().unwrap()
    }

    /// Roles assigned through `set_db_role`, drained.
    pub fn take_sets(&self) -> Vec<DbRole> {
        std::mem::take(&mut *self.sets.lock().unwrap())
    }

    pub fn db_reads(&self) -> usize {
        self.db_reads.load(Ordering::SeqCst)
    }

    pub fn sync_reads(&self) -> usize {
        self.sync_reads.load(Ordering::SeqCst)
    }

    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }

    fn record(&self, entry: &'static str) {
        if let Some(journal) = &self.journal {
            journal.push(entry);
        }
    }
}

impl Monitor for MockCandidate {
    fn get_role(&self) -> CollaboratorResult<NodeRole> {
        self.cluster_role
            .lock()
            .unwrap()
            .ok_or_else(|| CollaboratorError::new("cluster role unavailable"))
    }

    fn bounce(&self, peer: &Arc<dyn Candidate>) -> Arc<dyn Candidate> {
        Arc::clone(peer)
    }

    fn ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Candidate for MockCandidate {
    fn get_db_role(&self) -> CollaboratorResult<DbRole> {
        self.db_reads.fetch_add(1, Ordering::SeqCst);
        self.record("peer_read_begin");
        if !self.read_delay.is_zero() {
            thread::sleep(self.read_delay);
        }
        self.record("peer_read_end");

        let failing = self
            .failing_db_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CollaboratorError::new("connection refused"));
        }

        self.db_role
            .lock()
            .unwrap()
            .ok_or_else(|| CollaboratorError::new("connection refused"))
    }

    fn set_db_role(&self, role: DbRole) -> CollaboratorResult<()> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new("role store read-only"));
        }
        self.record("set");
        self.sets.lock().unwrap().push(role);
        *self.db_role.lock().unwrap() = Some(role);
        Ok(())
    }

    fn has_synced(&self) -> CollaboratorResult<bool> {
        self.sync_reads.fetch_add(1, Ordering::SeqCst);
        self.synced
            .lock()
            .unwrap()
            .ok_or_else(|| CollaboratorError::new("replication status unavailable"))
    }
}

/// A witness that relays to a fixed candidate, or back to the peer itself.
pub struct MockMonitor {
    relay: Option<Arc<dyn Candidate>>,
    bounces: AtomicUsize,
    ready_calls: AtomicUsize,
}

impl MockMonitor {
    pub fn new() -> Self {
        Self {
            relay: None,
            bounces: AtomicUsize::new(0),
            ready_calls: AtomicUsize::new(0),
        }
    }

    pub fn relaying_to(relay: Arc<dyn Candidate>) -> Self {
        Self {
            relay: Some(relay),
            ..Self::new()
        }
    }

    pub fn bounces(&self) -> usize {
        self.bounces.load(Ordering::SeqCst)
    }

    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }
}

impl Monitor for MockMonitor {
    fn get_role(&self) -> CollaboratorResult<NodeRole> {
        Ok(NodeRole::Initialized)
    }

    fn bounce(&self, peer: &Arc<dyn Candidate>) -> Arc<dyn Candidate> {
        self.bounces.fetch_add(1, Ordering::SeqCst);
        match &self.relay {
            Some(relay) => Arc::clone(relay),
            None => Arc::clone(peer),
        }
    }

    fn ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Physical transition requested of the performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Active,
    BackupOf,
    Single,
    Stop,
}

/// A performer that records every call.
#[derive(Default)]
pub struct RecordingPerformer {
    actions: Mutex<Vec<Action>>,
    journal: Option<Arc<Journal>>,
}

impl RecordingPerformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_journal(journal: Arc<Journal>) -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            journal: Some(journal),
        }
    }

    /// Recorded actions, drained.
    pub fn take(&self) -> Vec<Action> {
        std::mem::take(&mut *self.actions.lock().unwrap())
    }

    fn record(&self, action: Action) {
        if let Some(journal) = &self.journal {
            journal.push("perform");
        }
        self.actions.lock().unwrap().push(action);
    }
}

impl Performer for RecordingPerformer {
    fn transition_to_active(&self, _me: &dyn Candidate) {
        self.record(Action::Active);
    }

    fn transition_to_backup_of(&self, _me: &dyn Candidate, _other: &dyn Candidate) {
        self.record(Action::BackupOf);
    }

    fn transition_to_single(&self, _me: &dyn Candidate) {
        self.record(Action::Single);
    }

    fn stop(&self) {
        self.record(Action::Stop);
    }
}

/// Collaborators for one node under test.
pub struct Harness {
    pub me: Arc<MockCandidate>,
    pub other: Arc<MockCandidate>,
    pub monitor: Arc<MockMonitor>,
    pub performer: Arc<RecordingPerformer>,
}

impl Harness {
    pub fn new(me: MockCandidate, other: MockCandidate) -> Self {
        Self::with_monitor(me, other, MockMonitor::new())
    }

    pub fn with_monitor(me: MockCandidate, other: MockCandidate, monitor: MockMonitor) -> Self {
        Self {
            me: Arc::new(me),
            other: Arc::new(other),
            monitor: Arc::new(monitor),
            performer: Arc::new(RecordingPerformer::new()),
        }
    }

    pub fn with_performer(mut self, performer: RecordingPerformer) -> Self {
        self.performer = Arc::new(performer);
        self
    }

    /// Bootstrap a reconciler without pauses between attempts.
    pub fn build(&self) -> FailoverResult<Reconciler> {
        Reconciler::with_options(
            self.me.clone(),
            self.other.clone(),
            self.monitor.clone(),
            self.performer.clone(),
            ReconcilerOptions {
                bootstrap_retry: Duration::ZERO,
            },
        )
    }

    /// Bootstrap, then drain everything the bootstrap pass recorded.
    pub fn build_settled(&self) -> Reconciler {
        let reconciler = self.build().expect("bootstrap should succeed");
        self.performer.take();
        self.me.take_sets();
        reconciler
    }
}
