//! Serial port transport for a flip-dot sign
//!
//! Handles opening the sign's serial port and writing encoded frames to it.
//! Blocking port I/O runs on tokio's blocking pool so the scheduler task never stalls.

use super::{readiness, DisplaySink, Frame, FrameEncoder, Readiness, TextOptions};
use crate::config::{Offset, PanelConfig};
use crate::error::TransportError;
use async_trait::async_trait;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Configuration for serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyUSB0, /dev/pts/1)
    pub port_path: String,
    /// Baud rate (default: 4800 for Hanover controllers)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    /// Write timeout
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::from_panel(&PanelConfig::default())
    }
}

impl PortConfig {
    /// Create a new configuration with default sign settings
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Port settings for a panel configuration
    pub fn from_panel(panel: &PanelConfig) -> Self {
        Self {
            port_path: panel.port.clone(),
            baud_rate: panel.baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_secs(2),
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Open serial port to a sign
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> Result<Self, TransportError> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Serial {
                port: config.port_path.clone(),
                source,
            })?;

        Ok(Self { port })
    }

    /// Write a whole frame and flush it out
    pub fn write_frame(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }
}

type ConnectionSlot = Arc<Mutex<Option<SerialConnection>>>;

/// Display sink writing encoded frames to a serial port
pub struct SerialSink<E> {
    panel: PanelConfig,
    encoder: Arc<E>,
    staged: Frame,
    connection: ConnectionSlot,
}

impl<E: FrameEncoder + 'static> SerialSink<E> {
    /// Start opening the port in the background.
    ///
    /// The returned [`Readiness`] turns ready once the port is open. If opening
    /// fails, waiting on it yields the open error.
    pub fn open(port: PortConfig, panel: PanelConfig, encoder: E) -> (Self, Readiness) {
        let (signal, ready) = readiness();
        let connection: ConnectionSlot = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&connection);

        log::info!(
            "Opening {} at {} baud for sign address {}",
            port.port_path,
            port.baud_rate,
            panel.address
        );

        tokio::spawn(async move {
            let path = port.port_path.clone();
            match tokio::task::spawn_blocking(move || SerialConnection::open(port)).await {
                Ok(Ok(conn)) => {
                    *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(conn);
                    log::info!("Connected to {}", path);
                    signal.mark_ready();
                }
                Ok(Err(e)) => signal.fail(e),
                Err(e) => signal.fail(TransportError::Worker(e.to_string())),
            }
        });

        let sink = Self {
            panel,
            encoder: Arc::new(encoder),
            staged: Frame::default(),
            connection,
        };
        (sink, ready)
    }
}

#[async_trait]
impl<E: FrameEncoder + 'static> DisplaySink for SerialSink<E> {
    fn fill(&mut self, pattern: u8) -> Result<(), TransportError> {
        self.staged.stage_fill(pattern);
        Ok(())
    }

    fn write_text(
        &mut self,
        text: &str,
        options: &TextOptions,
        offset: Offset,
        invert: bool,
    ) -> Result<(), TransportError> {
        self.staged.stage_text(text, options, offset, invert);
        Ok(())
    }

    async fn send(&mut self) -> Result<(), TransportError> {
        let bytes = self.encoder.encode(&self.staged, &self.panel)?;
        let len = bytes.len();
        let slot = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
            let conn = guard.as_mut().ok_or(TransportError::NotReady)?;
            conn.write_frame(&bytes)
        })
        .await
        .map_err(|e| TransportError::Worker(e.to_string()))??;

        log::debug!("Sent {} byte frame to {}", len, self.panel.port);
        Ok(())
    }
}
