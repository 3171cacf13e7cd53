//! Display sink capability
//!
//! A display sink is the connection to one flip-dot panel. The scheduler talks to
//! it through [`DisplaySink`]:
//! - [`DisplaySink::fill`] and [`DisplaySink::write_text`] stage a [`Frame`]
//! - [`DisplaySink::send`] transmits the staged frame to the hardware
//!
//! Opening a sink is asynchronous. Completion is signalled on a [`Readiness`]
//! channel and transport failures are reported on an [`ErrorReporter`] instead
//! of being thrown back into the caller.

pub mod encoder;
pub mod events;
pub mod ready;
#[cfg(feature = "serial")]
pub mod serial;
pub mod simulated;

pub use encoder::{FrameEncoder, LineEncoder};
pub use events::{error_channel, ErrorEvents, ErrorReporter};
pub use ready::{readiness, ReadySignal, Readiness, SinkState};
#[cfg(feature = "serial")]
pub use serial::{PortConfig, SerialConnection, SerialSink};
pub use simulated::{PanelMonitor, SentFrame, SimulatedPanel};

use crate::config::Offset;
use crate::error::TransportError;
use async_trait::async_trait;
use serde::Serialize;

/// Options passed along with staged text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextOptions {
    /// Font identifier understood by the panel driver
    pub font: String,
}

impl TextOptions {
    pub fn new(font: &str) -> Self {
        Self {
            font: font.to_string(),
        }
    }
}

/// Text staged on a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedText {
    pub text: String,
    pub font: String,
    pub offset: Offset,
    pub invert: bool,
}

/// Panel content waiting to be sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Byte pattern the whole panel was last filled with
    pub fill: Option<u8>,
    /// Text drawn over the fill
    pub text: Option<StagedText>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.text.is_none()
    }

    /// Apply a fill; clears any staged text
    pub fn stage_fill(&mut self, pattern: u8) {
        self.fill = Some(pattern);
        self.text = None;
    }

    /// Stage text, replacing previously staged text
    pub fn stage_text(&mut self, text: &str, options: &TextOptions, offset: Offset, invert: bool) {
        self.text = Some(StagedText {
            text: text.to_string(),
            font: options.font.clone(),
            offset,
            invert,
        });
    }

    /// Staged text, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.text.as_str())
    }
}

/// Connection to a single flip-dot panel
///
/// Staging is local and cannot block; only [`DisplaySink::send`] touches the transport.
/// A sink has exactly one writer.
#[async_trait]
pub trait DisplaySink: Send {
    /// Fill the whole panel with a byte pattern (0xFF sets every dot)
    fn fill(&mut self, pattern: u8) -> Result<(), TransportError>;

    /// Stage text for the next transmission
    fn write_text(
        &mut self,
        text: &str,
        options: &TextOptions,
        offset: Offset,
        invert: bool,
    ) -> Result<(), TransportError>;

    /// Transmit the staged frame
    async fn send(&mut self) -> Result<(), TransportError>;
}

#[async_trait]
impl DisplaySink for Box<dyn DisplaySink> {
    fn fill(&mut self, pattern: u8) -> Result<(), TransportError> {
        (**self).fill(pattern)
    }

    fn write_text(
        &mut self,
        text: &str,
        options: &TextOptions,
        offset: Offset,
        invert: bool,
    ) -> Result<(), TransportError> {
        (**self).write_text(text, options, offset, invert)
    }

    async fn send(&mut self) -> Result<(), TransportError> {
        (**self).send().await
    }
}
