//! Configuration for the flip-dot clock
//!
//! This module provides:
//! - The immutable [`DisplayConfiguration`] the scheduler renders with
//! - Panel connection settings ([`PanelConfig`])
//! - Loading everything from a TOML file ([`AppConfig`])
//!
//! ```toml
//! [panel]
//! port = "/dev/ttyUSB0"
//! transport = "serial"
//!
//! [clock]
//! interval_ms = 1000
//! show_seconds = true
//! format = "pattern"
//! ```

pub mod display;
pub mod panel;

pub use display::{DisplayConfiguration, Offset, RefreshInterval, DEFAULT_FONT, DEFAULT_INTERVAL_MS};
pub use panel::{PanelConfig, Transport};

use crate::error::{ConfigError, Result};
use crate::format::FormatPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `[clock]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// Tick period in milliseconds
    pub interval_ms: u64,
    pub show_seconds: bool,
    pub font: String,
    pub offset: Offset,
    pub invert: bool,
    /// Formatting policy
    pub format: FormatSetting,
    /// strftime pattern for `format = "custom"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Fill applied once the panel is ready, before the first tick
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_fill: Option<u8>,
}

impl Default for ClockSection {
    fn default() -> Self {
        let display = DisplayConfiguration::default();
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            show_seconds: display.show_seconds,
            font: display.font,
            offset: display.offset,
            invert: display.invert,
            format: FormatSetting::default(),
            pattern: None,
            initial_fill: Some(0xFF),
        }
    }
}

/// `format` value in the `[clock]` section
///
/// ```toml
/// format = "locale-12h"
/// format = { custom = "%H.%M" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatSetting {
    /// `pattern`, `locale-12h`, `locale-24h`, or `custom` with a separate `pattern` key
    Named(String),
    /// Inline strftime pattern
    Custom { custom: String },
}

impl Default for FormatSetting {
    fn default() -> Self {
        FormatSetting::Named(String::from("pattern"))
    }
}

/// `[simulator]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    /// Append every sent frame to this JSON-lines file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_log: Option<PathBuf>,
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub panel: PanelConfig,
    pub clock: ClockSection,
    pub simulator: SimulatorSection,
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_content(&content, &path.to_string_lossy())
    }

    /// Parse and validate configuration content; `origin` names the source in errors
    pub fn parse_content(content: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the scheduler and sinks rely on
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.panel.validate()?;
        self.interval()?;
        self.format_policy()?;
        Ok(())
    }

    /// Display configuration from the `[clock]` section
    pub fn display(&self) -> DisplayConfiguration {
        DisplayConfiguration {
            show_seconds: self.clock.show_seconds,
            font: self.clock.font.clone(),
            offset: self.clock.offset,
            invert: self.clock.invert,
        }
    }

    pub fn interval(&self) -> std::result::Result<RefreshInterval, ConfigError> {
        RefreshInterval::from_millis(self.clock.interval_ms)
    }

    pub fn format_policy(&self) -> std::result::Result<FormatPolicy, ConfigError> {
        match &self.clock.format {
            FormatSetting::Named(name) => FormatPolicy::parse(name, self.clock.pattern.as_deref()),
            FormatSetting::Custom { custom } => FormatPolicy::parse("custom", Some(custom)),
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> std::result::Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, FormatError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::parse_content("", "inline").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.display(), DisplayConfiguration::default());
        assert_eq!(config.interval().unwrap(), RefreshInterval::default());
        assert_eq!(config.format_policy().unwrap(), FormatPolicy::Pattern);
        assert_eq!(config.clock.initial_fill, Some(0xFF));
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
            [panel]
            port = "/dev/ttyUSB0"
            address = 2
            rows = 7
            columns = 28
            panels_per_row = 3
            baud_rate = 9600
            transport = "simulated"

            [clock]
            interval_ms = 500
            show_seconds = true
            font = "7x5"
            offset = { x = 2, y = 1 }
            invert = true
            format = "custom"
            pattern = "%H.%M"
            initial_fill = 0

            [simulator]
            frame_log = "frames.jsonl"
        "#;

        let config = AppConfig::parse_content(content, "inline").unwrap();
        assert_eq!(config.panel.port, "/dev/ttyUSB0");
        assert_eq!(config.panel.address, 2);
        assert_eq!(config.panel.total_columns(), 84);
        assert_eq!(config.panel.transport, Transport::Simulated);

        let display = config.display();
        assert!(display.show_seconds);
        assert_eq!(display.font, "7x5");
        assert_eq!(display.offset, Offset::new(2, 1));
        assert!(display.invert);

        assert_eq!(config.interval().unwrap().as_duration().as_millis(), 500);
        assert_eq!(
            config.format_policy().unwrap(),
            FormatPolicy::Custom("%H.%M".to_string())
        );
        assert_eq!(config.clock.initial_fill, Some(0));
        assert_eq!(
            config.simulator.frame_log.as_deref(),
            Some(Path::new("frames.jsonl"))
        );
    }

    #[test]
    fn test_inline_custom_format() {
        let config =
            AppConfig::parse_content("[clock]\nformat = { custom = \"%H.%M\" }\n", "inline").unwrap();
        assert_eq!(
            config.format_policy().unwrap(),
            FormatPolicy::Custom("%H.%M".to_string())
        );
    }

    #[test]
    fn test_custom_format_without_wall_clock_fields_rejected() {
        let err = AppConfig::parse_content("[clock]\nformat = { custom = \"%H:%M %z\" }\n", "inline")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Format(FormatError::Unsupported(_)))
        ));
    }

    #[test]
    fn test_overflowing_geometry_rejected() {
        let err = AppConfig::parse_content(
            "[panel]\ncolumns = 4294967295\npanels_per_row = 2\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::GeometryOverflow { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = AppConfig::parse_content("[clock]\ninterval_ms = 0\n", "inline").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = AppConfig::parse_content("[clock]\nformat = \"iso\"\n", "inline").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnknownFormat(_))));
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let err = AppConfig::parse_content("[panel]\nrows = 0\n", "inline").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ZeroGeometry { .. })));
    }

    #[test]
    fn test_malformed_file_reports_origin() {
        let err = AppConfig::parse_content("[panel\n", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[clock]\nshow_seconds = true").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.display().show_seconds);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::load(Path::new("/nonexistent/flipdot.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let rendered = AppConfig::default().to_toml_string().unwrap();
        let parsed = AppConfig::parse_content(&rendered, "generated").unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
