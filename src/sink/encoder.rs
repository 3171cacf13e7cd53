//! Frame encoding for byte-oriented transports
//!
//! The wire format of a panel belongs to its controller, so transports take a
//! [`FrameEncoder`]. [`LineEncoder`] covers controllers with built-in fonts that
//! accept one ASCII command per line:
//!
//! ```text
//! @1 FILL FF
//! @1 TEXT 0,0 N Banner 14:05
//! ```

use super::Frame;
use crate::config::PanelConfig;
use crate::error::TransportError;

/// Turns a staged frame into the bytes sent to the panel
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, frame: &Frame, panel: &PanelConfig) -> Result<Vec<u8>, TransportError>;
}

/// Line-oriented ASCII command encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEncoder;

impl FrameEncoder for LineEncoder {
    fn encode(&self, frame: &Frame, panel: &PanelConfig) -> Result<Vec<u8>, TransportError> {
        if frame.is_empty() {
            return Err(TransportError::NothingStaged);
        }

        let mut out = String::new();

        if let Some(fill) = frame.fill {
            out.push_str(&format!("@{} FILL {:02X}\r\n", panel.address, fill));
        }

        if let Some(ref staged) = frame.text {
            if staged.text.contains(['\r', '\n']) || staged.font.contains(char::is_whitespace) {
                return Err(TransportError::Rejected(format!(
                    "cannot encode text {:?} in font {:?} as a single command line",
                    staged.text, staged.font
                )));
            }
            out.push_str(&format!(
                "@{} TEXT {},{} {} {} {}\r\n",
                panel.address,
                staged.offset.x,
                staged.offset.y,
                if staged.invert { 'I' } else { 'N' },
                staged.font,
                staged.text
            ));
        }

        Ok(out.into_bytes())
    }
}
