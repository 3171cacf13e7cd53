//! Recording sink for scheduler tests

use crate::config::Offset;
use crate::error::TransportError;
use crate::sink::{DisplaySink, Frame, StagedText, TextOptions};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Recorded {
    staged: Frame,
    fills: Vec<u8>,
    writes: Vec<String>,
    sent: Vec<Frame>,
    send_calls: usize,
    failing_sends: usize,
}

/// Inspection side of a [`RecordingSink`]
#[derive(Debug, Clone, Default)]
pub(crate) struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

/// Sink that records every call and can fail on demand
#[derive(Debug)]
pub(crate) struct RecordingSink {
    recorder: Recorder,
}

impl RecordingSink {
    pub(crate) fn new() -> (Self, Recorder) {
        let recorder = Recorder::default();
        (
            Self {
                recorder: recorder.clone(),
            },
            recorder,
        )
    }
}

impl Recorder {
    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap()
    }

    /// Make the next `count` sends fail
    pub(crate) fn fail_next_sends(&self, count: usize) {
        self.lock().failing_sends = count;
    }

    pub(crate) fn fills(&self) -> Vec<u8> {
        self.lock().fills.clone()
    }

    /// Every text passed to `write_text`
    pub(crate) fn writes(&self) -> Vec<String> {
        self.lock().writes.clone()
    }

    /// Texts of successfully sent frames
    pub(crate) fn sent(&self) -> Vec<String> {
        self.lock()
            .sent
            .iter()
            .map(|frame| frame.text().unwrap_or_default().to_string())
            .collect()
    }

    pub(crate) fn sent_frames(&self) -> Vec<Frame> {
        self.lock().sent.clone()
    }

    /// Calls to `send`, failed ones included
    pub(crate) fn send_calls(&self) -> usize {
        self.lock().send_calls
    }

    pub(crate) fn last_staged(&self) -> Option<StagedText> {
        self.lock().staged.text.clone()
    }
}

#[async_trait]
impl DisplaySink for RecordingSink {
    fn fill(&mut self, pattern: u8) -> Result<(), TransportError> {
        let mut recorded = self.recorder.lock();
        recorded.fills.push(pattern);
        recorded.staged.stage_fill(pattern);
        Ok(())
    }

    fn write_text(
        &mut self,
        text: &str,
        options: &TextOptions,
        offset: Offset,
        invert: bool,
    ) -> Result<(), TransportError> {
        let mut recorded = self.recorder.lock();
        recorded.writes.push(text.to_string());
        recorded.staged.stage_text(text, options, offset, invert);
        Ok(())
    }

    async fn send(&mut self) -> Result<(), TransportError> {
        let mut recorded = self.recorder.lock();
        recorded.send_calls += 1;
        if recorded.failing_sends > 0 {
            recorded.failing_sends -= 1;
            return Err(TransportError::Rejected("injected send failure".into()));
        }
        let frame = recorded.staged.clone();
        recorded.sent.push(frame);
        Ok(())
    }
}
