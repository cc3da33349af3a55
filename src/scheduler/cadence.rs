use dashmap::DashMap;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, sleep};
use tracing::debug;

/// A recurring sub-task of the refresh cycle, gated by a [`CadenceTracker`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Per-pool RSS score refresh.
    #[display("score-refresh")]
    Score,
    /// Per-asset CToken event scan.
    #[display("event-scan")]
    Events,
    /// Per-asset reserves and fees refresh.
    #[display("reserves-refresh")]
    Reserves,
    /// Per-pool user leverage scan.
    #[display("leverage-scan")]
    Leverage,
    /// Staking position refresh.
    #[display("staking-refresh")]
    Staking,
}

impl Task {
    /// Every task.
    pub const ALL: [Self; 5] =
        [Self::Score, Self::Events, Self::Reserves, Self::Leverage, Self::Staking];
}

/// Tracks when each [`Task`] last ran and decides whether it is due again.
///
/// A positive decision is committed after the confirmation delay, not when it is made. Every
/// caller consulting the tracker for the same task before the commit lands is allowed to run it,
/// which lets all pools and assets of a cycle share one decision. This also means two overlapping
/// cycles may both run a task; callers must tolerate that.
#[derive(Debug, Clone)]
pub struct CadenceTracker {
    /// Last committed run of each task. Tasks that never ran are missing.
    last_run: Arc<DashMap<Task, Instant>>,
    /// Delay after which a positive decision is committed.
    confirm_delay: Duration,
}

impl CadenceTracker {
    /// Creates a tracker on which no task has run yet.
    pub fn new(confirm_delay: Duration) -> Self {
        Self { last_run: Default::default(), confirm_delay }
    }

    /// Returns whether at least `interval` elapsed since `task` last ran.
    ///
    /// If so, the current time is recorded as the last run of `task`, immediately if
    /// `confirm_immediately` is set and after the confirmation delay otherwise.
    ///
    /// Must be called from within a tokio runtime.
    pub fn should_run(&self, task: Task, interval: Duration, confirm_immediately: bool) -> bool {
        debug_assert!(!interval.is_zero(), "task interval must be positive");

        let now = Instant::now();
        if let Some(elapsed) = self.elapsed(task, now)
            && elapsed < interval
        {
            debug!(
                %task,
                remaining = ?(interval - elapsed),
                "Skipping task until its next run"
            );
            return false;
        }

        if confirm_immediately {
            self.confirm(task, now);
        } else {
            let tracker = self.clone();
            tokio::spawn(async move {
                sleep(tracker.confirm_delay).await;
                tracker.confirm(task, now);
            });
        }

        debug!(%task, ?interval, "Running task");
        true
    }

    /// Returns the last committed run of `task`.
    pub fn last_run(&self, task: Task) -> Option<Instant> {
        self.last_run.get(&task).map(|last| *last)
    }

    fn elapsed(&self, task: Task, now: Instant) -> Option<Duration> {
        self.last_run(task).map(|last| now.saturating_duration_since(last))
    }

    /// Commits a run of `task` decided at `at`.
    ///
    /// Commits of overlapping decisions may land out of order; the last run never moves back.
    fn confirm(&self, task: Task, at: Instant) {
        self.last_run.entry(task).and_modify(|last| *last = (*last).max(at)).or_insert(at);
    }
}
