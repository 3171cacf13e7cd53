//! Display configuration handed to the refresh scheduler

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Font used by the clock scripts this crate replaces
pub const DEFAULT_FONT: &str = "Banner";

/// Default tick period
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Pixel offset of the text origin on the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Offset {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How the clock is drawn. Fixed for the lifetime of a scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfiguration {
    /// Show `HH:MM:SS` instead of `HH:MM`
    pub show_seconds: bool,
    /// Font identifier understood by the display driver
    pub font: String,
    /// Text origin
    pub offset: Offset,
    /// Draw dark text on a lit background
    pub invert: bool,
}

impl Default for DisplayConfiguration {
    fn default() -> Self {
        Self {
            show_seconds: false,
            font: DEFAULT_FONT.to_string(),
            offset: Offset::default(),
            invert: false,
        }
    }
}

impl DisplayConfiguration {
    /// Create a configuration with default font and placement
    pub fn new() -> Self {
        Self::default()
    }

    /// Show seconds
    pub fn with_seconds(mut self, show_seconds: bool) -> Self {
        self.show_seconds = show_seconds;
        self
    }

    /// Set the font identifier
    pub fn with_font(mut self, font: &str) -> Self {
        self.font = font.to_string();
        self
    }

    /// Set the text origin
    pub fn with_offset(mut self, offset: impl Into<Offset>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Set inverted rendering
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

/// Non-zero tick period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshInterval(Duration);

impl RefreshInterval {
    /// Wrap a period, rejecting zero
    pub fn new(period: Duration) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self(period))
    }

    pub fn from_millis(millis: u64) -> Result<Self, ConfigError> {
        Self::new(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_INTERVAL_MS))
    }
}
