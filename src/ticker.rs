//! Once-per-second timer driving a shared orchestrator.

use crate::logic::{RoundOrchestrator, TickOutcome};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Orchestrator shared between HTTP handlers and the ticker.
pub type SharedOrchestrator = Arc<Mutex<RoundOrchestrator>>;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Running ticker. Cancel before starting another one for the same orchestrator.
pub struct TickerHandle {
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tick `shared` every `period`, bound to its current epoch. The task stops on
/// its own once the epoch changes (`start`/`end`) or the session goes idle.
/// Requires a tokio runtime.
pub fn spawn_ticker(shared: SharedOrchestrator, period: Duration) -> TickerHandle {
    let epoch = match shared.lock() {
        Ok(g) => g.epoch(),
        Err(_) => u64::MAX,
    };
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            // Tick and any round generation it triggers run under one lock.
            let outcome = match shared.lock() {
                Ok(mut g) => g.tick(epoch),
                Err(_) => {
                    log::error!("Orchestrator lock poisoned, stopping ticker");
                    break;
                }
            };
            match outcome {
                TickOutcome::Stale => {
                    log::debug!("Ticker for epoch {} stopped", epoch);
                    break;
                }
                TickOutcome::Advanced { round } => log::debug!("Timer advanced to round {}", round),
                _ => {}
            }
        }
    });
    TickerHandle { task }
}
