//! Time formatting policies
//!
//! A [`TimeFormatter`] turns a wall-clock reading into the text pushed to the panel.
//! Two policies ship with the crate:
//! - [`PatternFormatter`]: zero-padded 24-hour `HH:MM` or `HH:MM:SS`, or any strftime pattern
//! - [`LocaleFormatter`]: time-of-day the way a locale clock shows it (`2:05 PM`, `14:05`)
//!
//! Anything else can be plugged in with [`from_fn`].

use crate::clock::ClockSource;
use crate::config::DisplayConfiguration;
use crate::error::{ConfigError, FormatError};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use std::fmt::Write;

/// `HH:MM`
pub const CLOCK_PATTERN: &str = "%H:%M";
/// `HH:MM:SS`
pub const CLOCK_PATTERN_SECONDS: &str = "%H:%M:%S";

/// Policy turning a time into display content
pub trait TimeFormatter: Send + Sync {
    fn format(
        &self,
        now: &NaiveDateTime,
        config: &DisplayConfiguration,
    ) -> Result<String, FormatError>;
}

impl TimeFormatter for Box<dyn TimeFormatter> {
    fn format(
        &self,
        now: &NaiveDateTime,
        config: &DisplayConfiguration,
    ) -> Result<String, FormatError> {
        (**self).format(now, config)
    }
}

/// Read the clock and format it
pub fn format_current_time<C, F>(
    clock: &C,
    formatter: &F,
    config: &DisplayConfiguration,
) -> Result<String, FormatError>
where
    C: ClockSource + ?Sized,
    F: TimeFormatter + ?Sized,
{
    formatter.format(&clock.now(), config)
}

/// Render `now` with a strftime pattern, without panicking on bad patterns
pub fn render_pattern(now: &NaiveDateTime, pattern: &str) -> Result<String, FormatError> {
    check_items(pattern)?;
    render_checked(now, pattern)
}

fn check_items(pattern: &str) -> Result<(), FormatError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidPattern(pattern.to_string()));
    }
    Ok(())
}

fn render_checked(now: &NaiveDateTime, pattern: &str) -> Result<String, FormatError> {
    let mut out = String::new();
    write!(out, "{}", now.format(pattern))
        .map_err(|_| FormatError::Unsupported(pattern.to_string()))?;
    Ok(out)
}

/// Reject patterns that would fail on every tick: bad syntax, or fields a
/// wall-clock time cannot fill (`%z`, `%Z`)
fn validate_pattern(pattern: &str) -> Result<(), FormatError> {
    check_items(pattern)?;
    render_checked(&NaiveDateTime::default(), pattern).map(|_| ())
}

/// Clock pattern formatter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternFormatter {
    custom: Option<String>,
}

impl PatternFormatter {
    /// `HH:MM`, or `HH:MM:SS` when the configuration shows seconds
    pub fn clock() -> Self {
        Self::default()
    }

    /// Fixed strftime pattern; ignores `show_seconds`
    pub fn custom(pattern: &str) -> Result<Self, FormatError> {
        validate_pattern(pattern)?;
        Ok(Self {
            custom: Some(pattern.to_string()),
        })
    }

    /// Pattern used for the given configuration
    pub fn pattern_for(&self, config: &DisplayConfiguration) -> &str {
        match &self.custom {
            Some(pattern) => pattern,
            None if config.show_seconds => CLOCK_PATTERN_SECONDS,
            None => CLOCK_PATTERN,
        }
    }
}

impl TimeFormatter for PatternFormatter {
    fn format(
        &self,
        now: &NaiveDateTime,
        config: &DisplayConfiguration,
    ) -> Result<String, FormatError> {
        render_pattern(now, self.pattern_for(config))
    }
}

/// Locale-style time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleFormatter {
    hour12: bool,
}

impl LocaleFormatter {
    /// `2:05 PM` / `2:05:09 PM`
    pub fn twelve_hour() -> Self {
        Self { hour12: true }
    }

    /// `14:05` / `14:05:09`
    pub fn twenty_four_hour() -> Self {
        Self { hour12: false }
    }
}

impl TimeFormatter for LocaleFormatter {
    fn format(
        &self,
        now: &NaiveDateTime,
        config: &DisplayConfiguration,
    ) -> Result<String, FormatError> {
        let pattern = match (self.hour12, config.show_seconds) {
            (true, true) => "%-I:%M:%S %p",
            (true, false) => "%-I:%M %p",
            (false, true) => CLOCK_PATTERN_SECONDS,
            (false, false) => CLOCK_PATTERN,
        };
        render_pattern(now, pattern)
    }
}

/// Formatter backed by a closure, see [`from_fn`]
pub struct FnFormatter<F>(F);

/// Build a formatter from a closure
pub fn from_fn<F>(f: F) -> FnFormatter<F>
where
    F: Fn(&NaiveDateTime, &DisplayConfiguration) -> Result<String, FormatError> + Send + Sync,
{
    FnFormatter(f)
}

impl<F> TimeFormatter for FnFormatter<F>
where
    F: Fn(&NaiveDateTime, &DisplayConfiguration) -> Result<String, FormatError> + Send + Sync,
{
    fn format(
        &self,
        now: &NaiveDateTime,
        config: &DisplayConfiguration,
    ) -> Result<String, FormatError> {
        (self.0)(now, config)
    }
}

/// Formatting policy selectable from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatPolicy {
    Pattern,
    Locale12h,
    Locale24h,
    Custom(String),
}

impl FormatPolicy {
    /// Parse a policy name; `custom` takes its strftime pattern from `pattern`
    pub fn parse(name: &str, pattern: Option<&str>) -> Result<Self, ConfigError> {
        match (name.to_lowercase().as_str(), pattern) {
            ("pattern", _) => Ok(FormatPolicy::Pattern),
            ("locale-12h", _) => Ok(FormatPolicy::Locale12h),
            ("locale-24h", _) => Ok(FormatPolicy::Locale24h),
            ("custom", Some(pattern)) => {
                validate_pattern(pattern)?;
                Ok(FormatPolicy::Custom(pattern.to_string()))
            }
            ("custom", None) => Err(FormatError::InvalidPattern(String::new()).into()),
            (other, _) => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }

    /// Instantiate the formatter
    pub fn formatter(&self) -> Result<Box<dyn TimeFormatter>, FormatError> {
        Ok(match self {
            FormatPolicy::Pattern => Box::new(PatternFormatter::clock()),
            FormatPolicy::Locale12h => Box::new(LocaleFormatter::twelve_hour()),
            FormatPolicy::Locale24h => Box::new(LocaleFormatter::twenty_four_hour()),
            FormatPolicy::Custom(pattern) => Box::new(PatternFormatter::custom(pattern)?),
        })
    }
}
