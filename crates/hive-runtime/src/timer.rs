//! Wall-clock pacing for tick runs.

use crate::events::TickReport;
use crate::orchestrator::TickOrchestrator;
use hive_core::error::StoreResult;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Runs ticks no faster than a fixed interval.
///
/// A tick that overruns the interval delays the next one rather than
/// triggering a burst of catch-up ticks.
pub struct TickTimer {
    interval: Interval,
}

impl TickTimer {
    pub fn new(interval_ms: u64) -> Self {
        let mut interval = interval(Duration::from_millis(interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next tick slot. The first call returns immediately.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Run `ticks` paced ticks.
    pub async fn run_timed(
        &mut self,
        orchestrator: &TickOrchestrator,
        ticks: u64,
    ) -> StoreResult<Vec<TickReport>> {
        self.run_timed_with_callback(orchestrator, ticks, |_| true).await
    }

    /// Run up to `ticks` paced ticks, stopping when `callback` returns false.
    pub async fn run_timed_with_callback<F>(
        &mut self,
        orchestrator: &TickOrchestrator,
        ticks: u64,
        mut callback: F,
    ) -> StoreResult<Vec<TickReport>>
    where
        F: FnMut(&TickReport) -> bool,
    {
        let mut reports = Vec::new();
        for _ in 0..ticks {
            self.tick().await;
            let report = orchestrator.run_tick().await?;
            let keep_going = callback(&report);
            reports.push(report);
            if !keep_going {
                break;
            }
        }
        Ok(reports)
    }
}
