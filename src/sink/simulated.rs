//! In-memory flip-dot panel
//!
//! Stands in for a real sign during development:
//! - Opens asynchronously and signals readiness like a serial sink
//! - Keeps the most recent sent frames for inspection through a [`PanelMonitor`]
//! - Optionally appends every sent frame to a JSON-lines log

use super::{readiness, DisplaySink, Frame, Readiness, TextOptions};
use crate::config::{Offset, PanelConfig};
use crate::error::TransportError;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Number of sent frames kept in memory
pub const FRAME_HISTORY: usize = 100;

/// A frame as it was sent to the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentFrame {
    pub timestamp: DateTime<Local>,
    pub sequence: u64,
    pub frame: Frame,
}

#[derive(Debug, Default)]
struct PanelState {
    staged: Frame,
    history: VecDeque<SentFrame>,
    sent: u64,
    frame_log: Option<BufWriter<File>>,
}

/// Simulated panel sink
#[derive(Debug)]
pub struct SimulatedPanel {
    config: PanelConfig,
    state: Arc<Mutex<PanelState>>,
}

/// Read-only view of a [`SimulatedPanel`], usable after the sink moved into a scheduler
#[derive(Debug, Clone)]
pub struct PanelMonitor {
    state: Arc<Mutex<PanelState>>,
}

fn lock(state: &Mutex<PanelState>) -> MutexGuard<'_, PanelState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl SimulatedPanel {
    /// Open the panel. Readiness is signalled from a spawned task, so this must
    /// run inside a tokio runtime.
    pub fn open(config: PanelConfig) -> (Self, Readiness) {
        let (signal, ready) = readiness();

        log::info!(
            "Opening simulated panel {} (address {}, {}x{} dots)",
            config.port,
            config.address,
            config.total_columns(),
            config.rows
        );

        tokio::spawn(async move {
            tokio::task::yield_now().await;
            signal.mark_ready();
            log::info!("Simulated panel ready");
        });

        let panel = Self {
            config,
            state: Arc::new(Mutex::new(PanelState::default())),
        };
        (panel, ready)
    }

    /// Append every sent frame to `path` as one JSON object per line
    pub fn with_frame_log(self, path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        lock(&self.state).frame_log = Some(BufWriter::new(file));
        log::info!("Logging frames to {}", path.display());
        Ok(self)
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn monitor(&self) -> PanelMonitor {
        PanelMonitor {
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl DisplaySink for SimulatedPanel {
    fn fill(&mut self, pattern: u8) -> Result<(), TransportError> {
        lock(&self.state).staged.stage_fill(pattern);
        Ok(())
    }

    fn write_text(
        &mut self,
        text: &str,
        options: &TextOptions,
        offset: Offset,
        invert: bool,
    ) -> Result<(), TransportError> {
        lock(&self.state)
            .staged
            .stage_text(text, options, offset, invert);
        Ok(())
    }

    async fn send(&mut self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if state.staged.is_empty() {
            return Err(TransportError::NothingStaged);
        }

        let sent = SentFrame {
            timestamp: Local::now(),
            sequence: state.sent + 1,
            frame: state.staged.clone(),
        };

        if let Some(ref mut writer) = state.frame_log {
            let line = serde_json::to_string(&sent).map_err(std::io::Error::from)?;
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }

        log::debug!(
            "Simulated panel frame #{}: {:?}",
            sent.sequence,
            sent.frame.text().unwrap_or("<fill>")
        );

        state.sent = sent.sequence;
        state.history.push_back(sent);
        if state.history.len() > FRAME_HISTORY {
            state.history.pop_front();
        }

        Ok(())
    }
}

impl PanelMonitor {
    /// Total frames sent since the panel was opened
    pub fn sent_count(&self) -> u64 {
        lock(&self.state).sent
    }

    /// Frame staged but not necessarily sent
    pub fn staged(&self) -> Frame {
        lock(&self.state).staged.clone()
    }

    pub fn last_frame(&self) -> Option<SentFrame> {
        lock(&self.state).history.back().cloned()
    }

    /// Text currently shown on the panel
    pub fn current_text(&self) -> Option<String> {
        self.last_frame()
            .and_then(|sent| sent.frame.text().map(str::to_string))
    }

    /// Recent frames, oldest first
    pub fn history(&self) -> Vec<SentFrame> {
        lock(&self.state).history.iter().cloned().collect()
    }

    /// Texts of the recent frames, oldest first
    pub fn sent_texts(&self) -> Vec<String> {
        lock(&self.state)
            .history
            .iter()
            .filter_map(|sent| sent.frame.text().map(str::to_string))
            .collect()
    }
}
