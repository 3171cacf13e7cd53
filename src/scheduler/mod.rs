//! Periodic display refresh with change suppression
//!
//! [`RefreshScheduler`] keeps a panel in sync with the clock:
//! - Waits for the sink to report ready before creating its timer
//! - Ticks at a fixed period, the first tick one period after readiness
//! - Formats the current time on each tick and only sends when the text changed
//! - Reports sink and format failures on the error channel and keeps ticking
//!
//! Each scheduler runs as one tokio task that owns its sink, so ticks never
//! overlap and nothing else writes to the panel while it runs.

mod handle;
mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use handle::ScheduleHandle;
pub use state::{RefreshState, RefreshStats, TickOutcome};

use crate::clock::ClockSource;
use crate::config::{DisplayConfiguration, RefreshInterval};
use crate::error::TransportError;
use crate::format::TimeFormatter;
use crate::sink::{DisplaySink, ErrorReporter, Readiness, TextOptions};
use state::StatsCounters;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Refresh scheduler for one display sink
pub struct RefreshScheduler<S, C, F> {
    sink: S,
    clock: C,
    formatter: F,
    initial_fill: Option<u8>,
    reporter: ErrorReporter,
}

impl<S, C, F> RefreshScheduler<S, C, F>
where
    S: DisplaySink + 'static,
    C: ClockSource + 'static,
    F: TimeFormatter + 'static,
{
    pub fn new(sink: S, clock: C, formatter: F) -> Self {
        Self {
            sink,
            clock,
            formatter,
            initial_fill: None,
            reporter: ErrorReporter::log_only(),
        }
    }

    /// Fill the panel with `pattern` once it is ready, before the first tick
    pub fn with_initial_fill(mut self, pattern: Option<u8>) -> Self {
        self.initial_fill = pattern;
        self
    }

    /// Where transport and format failures go
    pub fn with_error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Start ticking once `readiness` reports the sink open.
    ///
    /// Must be called inside a tokio runtime. Never fails: every error from here
    /// on is reported on the error channel. Dropping the returned handle stops
    /// the scheduler just like [`ScheduleHandle::stop`].
    pub fn start(
        self,
        readiness: Readiness,
        config: DisplayConfiguration,
        interval: RefreshInterval,
    ) -> ScheduleHandle<S> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let stats = Arc::new(StatsCounters::default());
        let task = tokio::spawn(self.run(readiness, config, interval, stop_rx, Arc::clone(&stats)));
        ScheduleHandle::new(stop_tx, stats, task)
    }

    async fn run(
        mut self,
        mut readiness: Readiness,
        config: DisplayConfiguration,
        interval: RefreshInterval,
        mut stop: watch::Receiver<bool>,
        stats: Arc<StatsCounters>,
    ) -> S {
        tokio::select! {
            biased;
            _ = stopped(&mut stop) => {
                log::info!("Refresh scheduler stopped before the display became ready");
                return self.sink;
            }
            ready = readiness.wait_ready() => {
                if let Err(e) = ready {
                    self.reporter.report(e);
                    return self.sink;
                }
            }
        }

        let period = interval.as_duration();
        log::info!(
            "Display ready, refreshing every {:?} (font {}, offset {}, seconds {})",
            period,
            config.font,
            config.offset,
            config.show_seconds
        );

        if let Some(pattern) = self.initial_fill {
            if let Err(e) = self.sink.fill(pattern) {
                self.reporter.report(e);
            }
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state = RefreshState::new();

        loop {
            tokio::select! {
                biased;
                _ = stopped(&mut stop) => break,
                _ = ticker.tick() => {}
            }

            // Stop is only observed between ticks; a started tick runs to completion.
            let outcome = state
                .tick(
                    &mut self.sink,
                    &self.clock,
                    &self.formatter,
                    &config,
                    &self.reporter,
                )
                .await;
            stats.record(outcome);
        }

        log::info!("Refresh scheduler stopped: {:?}", stats.snapshot());
        self.sink
    }
}

/// Resolves once stop is requested or the handle is dropped
async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Show fixed text once: wait for the sink, optionally fill, write and send
pub async fn show_text<S>(
    sink: &mut S,
    readiness: &mut Readiness,
    text: &str,
    config: &DisplayConfiguration,
    fill: Option<u8>,
) -> Result<(), TransportError>
where
    S: DisplaySink + ?Sized,
{
    readiness.wait_ready().await?;

    if let Some(pattern) = fill {
        sink.fill(pattern)?;
    }
    sink.write_text(text, &TextOptions::new(&config.font), config.offset, config.invert)?;
    sink.send().await?;

    log::info!("Displayed {:?}", text);
    Ok(())
}
