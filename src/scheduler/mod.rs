//! Refresh scheduling.
//!
//! The [`Scheduler`] starts a [`RefreshCycle`] on a fixed interval. Cycles are never awaited by
//! the scheduler, so a slow cycle overlaps with the next one instead of delaying it.

mod cadence;
pub use cadence::{CadenceTracker, Task};

mod cycle;
pub use cycle::RefreshCycle;

use crate::{config::ExporterConfig, source::DataSource};
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{Instrument, Level, error, info, span};

/// Runs a [`RefreshCycle`] immediately and then on every tick of a fixed interval.
#[derive(Debug, Clone)]
pub struct Scheduler {
    cycle: RefreshCycle,
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler reading from `source`, with a fresh [`CadenceTracker`].
    pub fn new(source: DataSource, config: Arc<ExporterConfig>) -> Self {
        let cadence = CadenceTracker::new(config.scheduler.confirm_delay);
        let interval = config.scheduler.interval;
        Self { cycle: RefreshCycle::new(source, cadence, config), interval }
    }

    /// Returns the cycle run on every tick.
    pub fn cycle(&self) -> &RefreshCycle {
        &self.cycle
    }

    /// Spawns the scheduler loop. It runs until the returned handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(interval = ?self.interval, "Starting refresh scheduler");

        tokio::spawn(async move {
            let mut clock = interval(self.interval);
            clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

            for number in 1u64.. {
                clock.tick().await;

                let cycle = self.cycle.clone();
                tokio::spawn(
                    async move {
                        if let Err(err) = cycle.run().await {
                            error!(%err, "Refresh cycle abandoned");
                        }
                    }
                    .instrument(span!(Level::INFO, "cycle", number)),
                );
            }
        })
    }
}
