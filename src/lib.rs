//! Flip-dot clock
//!
//! Keeps a flip-dot sign showing the current time. A [`RefreshScheduler`]
//! ticks at a fixed period once its display sink is open, formats the time and
//! only retransmits when the rendered text differs from what the panel shows.
//!
//! # Example
//!
//! ```no_run
//! use flipdot_clock::{
//!     DisplayConfiguration, PanelConfig, PatternFormatter, RefreshInterval, RefreshScheduler,
//!     SimulatedPanel, SystemClock,
//! };
//!
//! # async fn run() -> flipdot_clock::Result<()> {
//! let (panel, readiness) = SimulatedPanel::open(PanelConfig::default());
//! let handle = RefreshScheduler::new(panel, SystemClock::new(), PatternFormatter::clock())
//!     .with_initial_fill(Some(0xFF))
//!     .start(readiness, DisplayConfiguration::new(), RefreshInterval::default());
//!
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! let panel = handle.shutdown().await?;
//! println!("{:?}", panel.monitor().current_text());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod scheduler;
pub mod sink;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use config::{AppConfig, DisplayConfiguration, Offset, PanelConfig, RefreshInterval, Transport};
pub use error::{ConfigError, Error, FormatError, Result, TransportError};
pub use format::{FormatPolicy, LocaleFormatter, PatternFormatter, TimeFormatter};
pub use scheduler::{show_text, RefreshScheduler, RefreshStats, ScheduleHandle, TickOutcome};
pub use sink::{
    error_channel, readiness, DisplaySink, ErrorEvents, ErrorReporter, Frame, Readiness, SimulatedPanel,
    TextOptions,
};
