//! Error types for the refresh scheduler and its display sinks
//!
//! Errors are split the way the scheduler treats them:
//! - [`TransportError`]: the display sink failed to open or transmit. Reported, scheduling continues.
//! - [`FormatError`]: the current time could not be formatted. The tick is skipped.
//! - [`ConfigError`]: a configuration value is unusable. Only raised while loading configuration.

use thiserror::Error;

/// Failure raised by a display sink while opening or transmitting
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("display sink is not ready")]
    NotReady,

    #[error("display sink closed before it became ready")]
    Closed,

    #[error("no frame staged for transmission")]
    NothingStaged,

    #[error("I/O error on display transport: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serial")]
    #[error("serial port error on {port}: {source}")]
    Serial {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("transport worker failed: {0}")]
    Worker(String),

    #[error("{0}")]
    Rejected(String),
}

/// Failure while turning the current time into display content
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid time format pattern `{0}`")]
    InvalidPattern(String),

    #[error("pattern `{0}` needs date or timezone fields that a wall-clock time does not carry")]
    Unsupported(String),

    #[error("{0}")]
    Custom(String),
}

/// Unusable configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,

    #[error("panel geometry must be non-zero (rows={rows}, columns={columns}, panels_per_row={panels_per_row})")]
    ZeroGeometry {
        rows: u32,
        columns: u32,
        panels_per_row: u32,
    },

    #[error("panel width overflows: {columns} columns x {panels_per_row} panels")]
    GeometryOverflow { columns: u32, panels_per_row: u32 },

    #[error("unknown time format policy `{0}` (expected pattern, locale-12h, locale-24h or custom)")]
    UnknownFormat(String),

    #[error("invalid time format: {0}")]
    Format(#[from] FormatError),

    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Crate-wide error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("refresh task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_converts() {
        let err: Error = TransportError::NotReady.into();
        assert!(matches!(err, Error::Transport(TransportError::NotReady)));
        assert_eq!(err.to_string(), "display sink is not ready");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::ZeroGeometry {
            rows: 0,
            columns: 96,
            panels_per_row: 1,
        };
        assert!(err.to_string().contains("rows=0"));
        assert_eq!(
            ConfigError::UnknownFormat("iso".into()).to_string(),
            "unknown time format policy `iso` (expected pattern, locale-12h, locale-24h or custom)"
        );
    }
}
