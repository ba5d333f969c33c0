//! SLA scheduler
//!
//! Drives [`SlaUseCases::tick`] on a fixed period. Ticks run one at a time
//! on a single loop; a tick that overruns the period swallows the missed
//! ones instead of queueing them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::ports::inbound::SlaUseCases;

pub struct SlaScheduler {
    monitor: Arc<dyn SlaUseCases>,
    period: Duration,
}

impl SlaScheduler {
    pub fn new(monitor: Arc<dyn SlaUseCases>, period: Duration) -> Self {
        Self { monitor, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `shutdown` flips to true or its sender goes away.
    /// Returns the number of completed ticks.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(period_secs = self.period.as_secs(), "Starting SLA scheduler");

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut completed = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.monitor.tick().await;
                    completed += 1;
                    debug!(tick = completed, scanned = report.scanned, "Scheduled SLA tick finished");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(ticks = completed, "SLA scheduler stopped");
        completed
    }
}
