//! Asynchronous error channel
//!
//! Sinks and the scheduler never hand transport or formatting failures back to
//! their caller. They report them here: every report is logged, and forwarded to
//! an [`ErrorEvents`] receiver if one is attached.

use crate::error::Error;
use tokio::sync::mpsc;

/// Fire-and-forget error reporter. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    tx: Option<mpsc::UnboundedSender<Error>>,
}

/// Receiving end of an error channel
#[derive(Debug)]
pub struct ErrorEvents {
    rx: mpsc::UnboundedReceiver<Error>,
}

/// Create a linked reporter/receiver pair
pub fn error_channel() -> (ErrorReporter, ErrorEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ErrorReporter { tx: Some(tx) }, ErrorEvents { rx })
}

impl ErrorReporter {
    /// Reporter that only logs
    pub fn log_only() -> Self {
        Self::default()
    }

    /// Log an error and forward it to the receiver, if still listening
    pub fn report(&self, err: impl Into<Error>) {
        let err = err.into();
        log::error!("{}", err);

        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is listening; the log line stands.
            let _ = tx.send(err);
        }
    }
}

impl ErrorEvents {
    /// Wait for the next error; `None` once every reporter is dropped
    pub async fn recv(&mut self) -> Option<Error> {
        self.rx.recv().await
    }

    /// Next error if one is queued
    pub fn try_recv(&mut self) -> Option<Error> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued so far
    pub fn drain(&mut self) -> Vec<Error> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
