//! Per-tick refresh logic and counters

use crate::clock::ClockSource;
use crate::config::DisplayConfiguration;
use crate::format::{format_current_time, TimeFormatter};
use crate::sink::{DisplaySink, ErrorReporter, TextOptions};
use std::sync::atomic::{AtomicU64, Ordering};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Content changed and was sent
    Rendered,
    /// Content equal to what is on the panel; nothing sent
    Unchanged,
    /// Formatting failed; tick skipped
    FormatFailed,
    /// The sink failed to stage or send; content will be retried next tick
    TransportFailed,
}

/// Content tracking for one scheduler
#[derive(Debug, Default)]
pub struct RefreshState {
    /// `None` until the first successful transmission
    last_rendered: Option<String>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content currently on the panel
    pub fn last_rendered(&self) -> Option<&str> {
        self.last_rendered.as_deref()
    }

    /// Run one tick: format, compare, and send only on change
    pub async fn tick<S, C, F>(
        &mut self,
        sink: &mut S,
        clock: &C,
        formatter: &F,
        config: &DisplayConfiguration,
        reporter: &ErrorReporter,
    ) -> TickOutcome
    where
        S: DisplaySink + ?Sized,
        C: ClockSource + ?Sized,
        F: TimeFormatter + ?Sized,
    {
        let content = match format_current_time(clock, formatter, config) {
            Ok(content) => content,
            Err(e) => {
                reporter.report(e);
                return TickOutcome::FormatFailed;
            }
        };

        if self.last_rendered.as_deref() == Some(content.as_str()) {
            return TickOutcome::Unchanged;
        }

        let options = TextOptions::new(&config.font);
        let result = match sink.write_text(&content, &options, config.offset, config.invert) {
            Ok(()) => sink.send().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                log::debug!("Rendered {:?}", content);
                self.last_rendered = Some(content);
                TickOutcome::Rendered
            }
            Err(e) => {
                reporter.report(e);
                TickOutcome::TransportFailed
            }
        }
    }
}

/// Snapshot of scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub ticks: u64,
    pub renders: u64,
    pub unchanged: u64,
    pub format_failures: u64,
    pub transport_failures: u64,
}

/// Live counters shared between the scheduler task and its handle
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    ticks: AtomicU64,
    renders: AtomicU64,
    unchanged: AtomicU64,
    format_failures: AtomicU64,
    transport_failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record(&self, outcome: TickOutcome) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            TickOutcome::Rendered => &self.renders,
            TickOutcome::Unchanged => &self.unchanged,
            TickOutcome::FormatFailed => &self.format_failures,
            TickOutcome::TransportFailed => &self.transport_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RefreshStats {
        RefreshStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            renders: self.renders.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            format_failures: self.format_failures.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{Error, FormatError, TransportError};
    use crate::format::{self, PatternFormatter};
    use crate::scheduler::testing::RecordingSink;
    use crate::sink::error_channel;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_tick_always_renders() {
        let (mut sink, recorder) = RecordingSink::new();
        let clock = ManualClock::new(at(14, 5, 9));
        let mut state = RefreshState::new();
        assert_eq!(state.last_rendered(), None);

        let outcome = state
            .tick(
                &mut sink,
                &clock,
                &PatternFormatter::clock(),
                &DisplayConfiguration::new(),
                &ErrorReporter::log_only(),
            )
            .await;

        assert_eq!(outcome, TickOutcome::Rendered);
        assert_eq!(state.last_rendered(), Some("14:05"));
        assert_eq!(recorder.sent(), vec!["14:05"]);
    }

    #[tokio::test]
    async fn test_empty_content_still_renders_first() {
        let (mut sink, recorder) = RecordingSink::new();
        let blank = format::from_fn(|_: &NaiveDateTime, _: &DisplayConfiguration| Ok(String::new()));
        let mut state = RefreshState::new();

        let outcome = state
            .tick(
                &mut sink,
                &ManualClock::new(at(0, 0, 0)),
                &blank,
                &DisplayConfiguration::new(),
                &ErrorReporter::log_only(),
            )
            .await;

        assert_eq!(outcome, TickOutcome::Rendered);
        assert_eq!(recorder.sent(), vec![""]);
    }

    #[tokio::test]
    async fn test_identical_content_sent_once() {
        let (mut sink, recorder) = RecordingSink::new();
        let clock = ManualClock::new(at(14, 5, 0));
        let formatter = PatternFormatter::clock();
        let config = DisplayConfiguration::new();
        let reporter = ErrorReporter::log_only();
        let mut state = RefreshState::new();

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            outcomes.push(state.tick(&mut sink, &clock, &formatter, &config, &reporter).await);
            clock.advance(Duration::seconds(10));
        }

        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Rendered,
                TickOutcome::Unchanged,
                TickOutcome::Unchanged,
                TickOutcome::Unchanged,
                TickOutcome::Unchanged,
            ]
        );
        assert_eq!(recorder.writes(), vec!["14:05"]);
        assert_eq!(recorder.send_calls(), 1);

        clock.advance(Duration::seconds(20));
        let outcome = state.tick(&mut sink, &clock, &formatter, &config, &reporter).await;
        assert_eq!(outcome, TickOutcome::Rendered);
        assert_eq!(recorder.sent(), vec!["14:05", "14:06"]);
    }

    #[tokio::test]
    async fn test_sink_receives_display_configuration() {
        let (mut sink, recorder) = RecordingSink::new();
        let config = DisplayConfiguration::new()
            .with_font("7x5")
            .with_offset((2, 1))
            .with_invert(true);

        RefreshState::new()
            .tick(
                &mut sink,
                &ManualClock::new(at(9, 30, 0)),
                &PatternFormatter::clock(),
                &config,
                &ErrorReporter::log_only(),
            )
            .await;

        let staged = recorder.last_staged().unwrap();
        assert_eq!(staged.text, "09:30");
        assert_eq!(staged.font, "7x5");
        assert_eq!(staged.offset, crate::config::Offset::new(2, 1));
        assert!(staged.invert);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_previous_content() {
        let (mut sink, recorder) = RecordingSink::new();
        recorder.fail_next_sends(1);
        let (reporter, mut events) = error_channel();
        let clock = ManualClock::new(at(14, 5, 9));
        let formatter = PatternFormatter::clock();
        let config = DisplayConfiguration::new();
        let mut state = RefreshState::new();

        let first = state.tick(&mut sink, &clock, &formatter, &config, &reporter).await;
        assert_eq!(first, TickOutcome::TransportFailed);
        assert_eq!(state.last_rendered(), None);
        assert!(matches!(
            events.try_recv(),
            Some(Error::Transport(TransportError::Rejected(_)))
        ));

        let second = state.tick(&mut sink, &clock, &formatter, &config, &reporter).await;
        assert_eq!(second, TickOutcome::Rendered);
        assert_eq!(recorder.writes(), vec!["14:05", "14:05"]);
        assert_eq!(recorder.sent(), vec!["14:05"]);
    }

    #[tokio::test]
    async fn test_format_failure_skips_sink() {
        let (mut sink, recorder) = RecordingSink::new();
        let (reporter, mut events) = error_channel();
        let failing = format::from_fn(|_: &NaiveDateTime, _: &DisplayConfiguration| {
            Err(FormatError::Custom("clock unavailable".into()))
        });
        let mut state = RefreshState::new();

        let outcome = state
            .tick(
                &mut sink,
                &ManualClock::new(at(14, 5, 9)),
                &failing,
                &DisplayConfiguration::new(),
                &reporter,
            )
            .await;

        assert_eq!(outcome, TickOutcome::FormatFailed);
        assert!(recorder.writes().is_empty());
        assert_eq!(recorder.send_calls(), 0);
        assert!(matches!(events.try_recv(), Some(Error::Format(_))));
    }

    #[test]
    fn test_stats_counters() {
        let counters = StatsCounters::default();
        counters.record(TickOutcome::Rendered);
        counters.record(TickOutcome::Unchanged);
        counters.record(TickOutcome::Unchanged);
        counters.record(TickOutcome::TransportFailed);

        assert_eq!(
            counters.snapshot(),
            RefreshStats {
                ticks: 4,
                renders: 1,
                unchanged: 2,
                format_failures: 0,
                transport_failures: 1,
            }
        );
    }
}
