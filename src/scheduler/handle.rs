//! Control handle for a running refresh scheduler

use super::state::{RefreshStats, StatsCounters};
use crate::error::Error;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle returned by [`RefreshScheduler::start`](super::RefreshScheduler::start)
///
/// Dropping the handle stops the scheduler.
#[derive(Debug)]
pub struct ScheduleHandle<S> {
    stop: watch::Sender<bool>,
    stats: Arc<StatsCounters>,
    task: JoinHandle<S>,
}

impl<S> ScheduleHandle<S> {
    pub(crate) fn new(stop: watch::Sender<bool>, stats: Arc<StatsCounters>, task: JoinHandle<S>) -> Self {
        Self { stop, stats, task }
    }

    /// Stop ticking. A tick already in progress finishes first.
    ///
    /// Calling this again has no effect.
    pub fn stop(&self) {
        if !self.stop.send_replace(true) {
            log::info!("Stopping refresh scheduler");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Whether the scheduler task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Resolves once the scheduler task has exited, whether stopped or not.
    ///
    /// A scheduler exits on its own when its sink fails to open.
    pub async fn finished(&self) {
        self.stop.closed().await;
    }

    /// Counters so far
    pub fn stats(&self) -> RefreshStats {
        self.stats.snapshot()
    }

    /// Stop and wait for the scheduler to exit, returning its sink
    pub async fn shutdown(self) -> Result<S, Error> {
        self.stop();
        let Self { stop, task, .. } = self;
        let sink = task.await.map_err(|e| Error::TaskFailed(e.to_string()))?;
        drop(stop);
        Ok(sink)
    }
}
