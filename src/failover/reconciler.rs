//! Reconciler
//!
//! Owns the decision state machine of one node. Every decide-and-act
//! sequence (read peer, plan, set local role, perform) runs under a single
//! mutex, so passes, promotions and demotions never interleave.
//!
//! The reconciler keeps no decision state between passes. Each pass is
//! re-derived from what the collaborators report at that moment.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uuid::Uuid;

use super::decider::{Decider, DeciderStatus};
use super::errors::{FailoverError, FailoverResult};
use super::plan::{plan, CandidateFacts, Decision, PeerObservation, Transition};
use super::role::{is_split_brain, DbRole};
use super::traits::{Candidate, Monitor, Performer};
use crate::observability::{Event, FailoverMetrics, Logger};

/// Construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Pause between bootstrap attempts that found the cluster unavailable.
    pub bootstrap_retry: Duration,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            bootstrap_retry: Duration::from_millis(500),
        }
    }
}

/// Proof that the decision lock is held.
type DecisionGuard<'a> = MutexGuard<'a, ()>;

/// Failover reconciler for the local node
pub struct Reconciler {
    /// Serializes every full decide-and-act sequence
    lock: Mutex<()>,
    me: Arc<dyn Candidate>,
    other: Arc<dyn Candidate>,
    monitor: Arc<dyn Monitor>,
    performer: Arc<dyn Performer>,
    metrics: FailoverMetrics,
}

impl Reconciler {
    /// Construct with default options. See [`Reconciler::with_options`].
    pub fn new(
        me: Arc<dyn Candidate>,
        other: Arc<dyn Candidate>,
        monitor: Arc<dyn Monitor>,
        performer: Arc<dyn Performer>,
    ) -> FailoverResult<Self> {
        Self::with_options(me, other, monitor, performer, ReconcilerOptions::default())
    }

    /// Construct and bootstrap a reconciler.
    ///
    /// Blocks until one pass completes without `ClusterUnavailable`. Before
    /// each attempt the peer and the monitor are waited on. Any other error
    /// aborts construction with `BootstrapAborted`.
    pub fn with_options(
        me: Arc<dyn Candidate>,
        other: Arc<dyn Candidate>,
        monitor: Arc<dyn Monitor>,
        performer: Arc<dyn Performer>,
        options: ReconcilerOptions,
    ) -> FailoverResult<Self> {
        let reconciler = Self {
            lock: Mutex::new(()),
            me,
            other,
            monitor,
            performer,
            metrics: FailoverMetrics::new(),
        };
        reconciler.bootstrap(options)?;
        Ok(reconciler)
    }

    fn bootstrap(&self, options: ReconcilerOptions) -> FailoverResult<()> {
        Logger::event(Event::BootstrapBegin, &[]);

        loop {
            self.metrics.record_bootstrap_attempt();
            let attempt = self.metrics.bootstrap_attempts();
            let attempt_str = attempt.to_string();

            // The local candidate is ready by contract
            self.other.ready();
            self.monitor.ready();

            match self.recheck() {
                Ok(transition) => {
                    Logger::event(
                        Event::BootstrapComplete,
                        &[
                            ("attempts", attempt_str.as_str()),
                            ("transition", transition.name()),
                        ],
                    );
                    return Ok(());
                }
                Err(FailoverError::ClusterUnavailable) => {
                    Logger::event(Event::BootstrapRetry, &[("attempt", attempt_str.as_str())]);
                    if !options.bootstrap_retry.is_zero() {
                        thread::sleep(options.bootstrap_retry);
                    }
                }
                Err(FailoverError::Collaborator(source)) => {
                    let error = source.to_string();
                    Logger::event(
                        Event::BootstrapAborted,
                        &[("attempts", attempt_str.as_str()), ("error", error.as_str())],
                    );
                    return Err(FailoverError::BootstrapAborted {
                        attempts: attempt,
                        source,
                    });
                }
                Err(e @ FailoverError::BootstrapAborted { .. }) => return Err(e),
            }
        }
    }

    /// Counters for this reconciler.
    pub fn metrics(&self) -> &FailoverMetrics {
        &self.metrics
    }

    /// The local candidate.
    pub fn me(&self) -> &Arc<dyn Candidate> {
        &self.me
    }

    /// The peer candidate.
    pub fn other(&self) -> &Arc<dyn Candidate> {
        &self.other
    }

    /// Run the periodic loop on a dedicated thread.
    ///
    /// The first pass runs one `interval` after spawning.
    pub fn spawn_loop(self: &Arc<Self>, interval: Duration) -> LoopHandle {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let reconciler = Arc::clone(self);
        let interval_ms = interval.as_millis().to_string();

        let join = thread::spawn(move || {
            Logger::event(Event::LoopStart, &[("interval_ms", interval_ms.as_str())]);
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let _ = reconciler.recheck();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            Logger::event(Event::LoopStop, &[]);
        });

        LoopHandle { stop_tx, join }
    }

    fn acquire(&self) -> DecisionGuard<'_> {
        // The guarded value is (); a panic inside a previous holder leaves
        // nothing half-written here.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the peer's database role, falling back to the witness.
    fn observe_peer(&self, _guard: &DecisionGuard<'_>, pass_id: &str) -> PeerObservation {
        let direct_err = match self.other.get_db_role() {
            Ok(role) => return PeerObservation::Reachable(role),
            Err(e) => e,
        };

        self.metrics.record_bounce();
        let error = direct_err.to_string();
        Logger::event(
            Event::PeerBounce,
            &[("error", error.as_str()), ("pass_id", pass_id)],
        );

        match self.monitor.bounce(&self.other).get_db_role() {
            Ok(role) => PeerObservation::Reachable(role),
            Err(e) => {
                let error = e.to_string();
                Logger::event(
                    Event::PeerUnreachable,
                    &[("error", error.as_str()), ("pass_id", pass_id)],
                );
                PeerObservation::Unreachable
            }
        }
    }

    fn reconcile(&self, guard: &DecisionGuard<'_>, pass_id: &str) -> FailoverResult<Transition> {
        let peer = self.observe_peer(guard, pass_id);
        let decision = plan(peer, &CandidateFacts(self.me.as_ref()))?;
        self.apply(guard, peer, decision, pass_id)
    }

    fn apply(
        &self,
        guard: &DecisionGuard<'_>,
        peer: PeerObservation,
        decision: Decision,
        pass_id: &str,
    ) -> FailoverResult<Transition> {
        let peer_role = match peer {
            PeerObservation::Reachable(role) => role.as_str(),
            PeerObservation::Unreachable => "unreachable",
        };
        let fields = [
            ("pass_id", pass_id),
            ("peer_role", peer_role),
            ("reason", decision.reason),
            ("transition", decision.transition.name()),
        ];

        match decision.transition {
            Transition::Stay => {
                Logger::event(Event::Steady, &fields);
                return Ok(Transition::Stay);
            }
            Transition::Stop => {
                self.stop(guard);
                Logger::event(Event::Stop, &fields);
                return Err(FailoverError::ClusterUnavailable);
            }
            Transition::BecomeActive => self.become_active(guard)?,
            Transition::BecomeBackup => self.become_backup(guard)?,
            Transition::BecomeSingle => self.become_single(guard)?,
        }

        if let (PeerObservation::Reachable(peer_role), Some(target)) =
            (peer, decision.transition.target_role())
        {
            debug_assert!(
                !is_split_brain(target, peer_role),
                "planned {} against a {} peer",
                target,
                peer_role
            );
        }

        Logger::event(Event::Transition, &fields);
        Ok(decision.transition)
    }

    fn become_active(&self, _guard: &DecisionGuard<'_>) -> FailoverResult<()> {
        self.me.set_db_role(DbRole::Active)?;
        self.performer.transition_to_active(self.me.as_ref());
        self.metrics.record_to_active();
        Ok(())
    }

    fn become_backup(&self, _guard: &DecisionGuard<'_>) -> FailoverResult<()> {
        self.me.set_db_role(DbRole::Backup)?;
        self.performer
            .transition_to_backup_of(self.me.as_ref(), self.other.as_ref());
        self.metrics.record_to_backup();
        Ok(())
    }

    fn become_single(&self, _guard: &DecisionGuard<'_>) -> FailoverResult<()> {
        self.me.set_db_role(DbRole::Single)?;
        self.performer.transition_to_single(self.me.as_ref());
        self.metrics.record_to_single();
        Ok(())
    }

    fn stop(&self, _guard: &DecisionGuard<'_>) {
        self.performer.stop();
        self.metrics.record_stop();
    }
}

impl Decider for Reconciler {
    fn recheck(&self) -> FailoverResult<Transition> {
        let guard = self.acquire();
        let pass_id = Uuid::new_v4().to_string();
        self.metrics.record_pass();

        let result = self.reconcile(&guard, &pass_id);
        match &result {
            Ok(_) => {}
            Err(FailoverError::ClusterUnavailable) => self.metrics.record_cluster_unavailable(),
            Err(e) => {
                self.metrics.record_failed_pass();
                let error = e.to_string();
                Logger::event(
                    Event::RecheckFailed,
                    &[
                        ("code", e.code()),
                        ("error", error.as_str()),
                        ("pass_id", pass_id.as_str()),
                    ],
                );
            }
        }
        result
    }

    fn promote(&self) -> FailoverResult<()> {
        let guard = self.acquire();
        self.become_active(&guard)?;
        self.metrics.record_promotion();
        Logger::event(Event::Promote, &[("db_role", DbRole::Active.as_str())]);
        Ok(())
    }

    fn demote(&self) -> FailoverResult<()> {
        let guard = self.acquire();
        self.become_backup(&guard)?;
        self.metrics.record_demotion();
        Logger::event(Event::Demote, &[("db_role", DbRole::Backup.as_str())]);
        Ok(())
    }

    fn status(&self) -> DeciderStatus {
        let _guard = self.acquire();
        DeciderStatus {
            db_role: self.me.get_db_role().ok(),
            cluster_role: self.me.get_role().ok(),
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Handle to a loop started with [`Reconciler::spawn_loop`].
pub struct LoopHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl LoopHandle {
    /// Stop the loop and wait for an in-flight pass to finish.
    pub fn stop(self) -> thread::Result<()> {
        let _ = self.stop_tx.send(());
        self.join.join()
    }
}
