//! Panel connection settings
//!
//! Describes where the flip-dot sign lives and how big it is. The defaults match
//! a single 96x16 Hanover sign at address 1 behind a 4800 baud serial link.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default serial device of the sign (a pseudo-terminal when testing against a simulator)
pub const DEFAULT_PORT: &str = "/dev/pts/1";

/// Default baud rate for Hanover flip-dot controllers
pub const DEFAULT_BAUD: u32 = 4800;

/// Which display sink backs the panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Real sign on a serial port (requires the `serial` feature)
    #[default]
    Serial,
    /// In-memory panel
    Simulated,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Serial => write!(f, "serial"),
            Transport::Simulated => write!(f, "simulated"),
        }
    }
}

/// Configuration for the panel connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Serial port path (e.g., /dev/ttyUSB0, /dev/pts/1)
    pub port: String,
    /// Sign address on the bus
    pub address: u8,
    /// Dot rows per panel
    pub rows: u32,
    /// Dot columns per panel
    pub columns: u32,
    /// Panels tiled horizontally
    pub panels_per_row: u32,
    /// Baud rate (default: 4800)
    pub baud_rate: u32,
    /// Sink implementation
    pub transport: Transport,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            port: String::from(DEFAULT_PORT),
            address: 1,
            rows: 16,
            columns: 96,
            panels_per_row: 1,
            baud_rate: DEFAULT_BAUD,
            transport: Transport::default(),
        }
    }
}

impl PanelConfig {
    /// Create a configuration for the given port with default geometry
    pub fn new(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Default::default()
        }
    }

    /// Set the panel geometry
    pub fn with_geometry(mut self, rows: u32, columns: u32, panels_per_row: u32) -> Self {
        self.rows = rows;
        self.columns = columns;
        self.panels_per_row = panels_per_row;
        self
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the transport
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Total dot columns across all tiled panels, saturating at `u32::MAX`
    pub fn total_columns(&self) -> u32 {
        self.columns.saturating_mul(self.panels_per_row)
    }

    /// Reject zero-sized geometry and widths that do not fit a `u32`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 || self.panels_per_row == 0 {
            return Err(ConfigError::ZeroGeometry {
                rows: self.rows,
                columns: self.columns,
                panels_per_row: self.panels_per_row,
            });
        }
        if self.columns.checked_mul(self.panels_per_row).is_none() {
            return Err(ConfigError::GeometryOverflow {
                columns: self.columns,
                panels_per_row: self.panels_per_row,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PanelConfig::default();
        assert_eq!(config.port, "/dev/pts/1");
        assert_eq!(config.address, 1);
        assert_eq!(config.baud_rate, 4800);
        assert_eq!(config.total_columns(), 96);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PanelConfig::new("/dev/ttyUSB0")
            .with_geometry(7, 28, 2)
            .with_baud_rate(9600)
            .with_transport(Transport::Simulated);

        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.total_columns(), 56);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.transport, Transport::Simulated);
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let config = PanelConfig::default().with_geometry(16, 0, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroGeometry { columns: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_geometry_rejected() {
        let config = PanelConfig::default().with_geometry(16, u32::MAX, 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GeometryOverflow { panels_per_row: 2, .. })
        ));
        assert_eq!(config.total_columns(), u32::MAX);
    }
}
