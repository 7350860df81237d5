//! Periodic tick scheduler.
//!
//! A single task drives the engine, so ticks are strictly serialized: a
//! tick that outlives its interval causes the overlapped timer fire to be
//! skipped, never run concurrently. Shutdown is observed between ticks, so
//! an in-flight tick always finishes and publishes before the task exits.

use crate::engine::SimulationEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Handle to a running scheduler task.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl SchedulerHandle {
    /// Requests a clean stop and waits for the task; returns the number of
    /// ticks it executed.
    pub async fn stop(self) -> u64 {
        let _ = self.shutdown.send(true);
        self.task.await.unwrap_or(0)
    }
}

/// Spawns the scheduler, ticking `engine` every `interval`. After each tick
/// the engine's configured interval is re-read, so a `reconfigure` with a
/// new `tick_interval` takes effect without respawning.
pub fn spawn(engine: Arc<SimulationEngine>, interval: Duration) -> SchedulerHandle {
    let (shutdown, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut period = interval;
        let mut timer = new_timer(period).await;

        info!("scheduler started (interval {:?})", period);
        let mut executed = 0u64;
        loop {
            tokio::select! {
                _ = timer.tick() => {
                    engine.tick();
                    executed += 1;

                    // A reconfigure may have changed the tick interval;
                    // rebuild the timer so the new period takes effect
                    // from the next tick.
                    let want = engine.tick_interval();
                    if want != period {
                        debug!("tick interval changed: {period:?} -> {want:?}");
                        period = want;
                        timer = new_timer(period).await;
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("scheduler stopped after {executed} ticks");
        executed
    });

    SchedulerHandle { shutdown, task }
}

/// Builds an interval timer with its immediate first fire already
/// consumed, so the next fire lands one full period later.
async fn new_timer(period: Duration) -> tokio::time::Interval {
    let mut timer = tokio::time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer.tick().await;
    timer
}
