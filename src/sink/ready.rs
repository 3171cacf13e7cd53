//! Readiness signalling between a sink and its scheduler

use crate::error::TransportError;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Connection state of a display sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    NotReady,
    Ready,
}

/// Why opening failed, handed to the first waiter
type FailureSlot = Arc<Mutex<Option<TransportError>>>;

/// Sink side: announces that the panel is open, or why it never will be
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<SinkState>,
    failure: FailureSlot,
}

/// Scheduler side: waits for the panel to open
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<SinkState>,
    failure: FailureSlot,
}

/// Create a linked signal/readiness pair in the `NotReady` state
pub fn readiness() -> (ReadySignal, Readiness) {
    let (tx, rx) = watch::channel(SinkState::NotReady);
    let failure = FailureSlot::default();
    (
        ReadySignal {
            tx,
            failure: Arc::clone(&failure),
        },
        Readiness { rx, failure },
    )
}

impl ReadySignal {
    /// Mark the sink open. Repeated calls are no-ops.
    pub fn mark_ready(&self) {
        self.tx.send_if_modified(|state| {
            let changed = *state != SinkState::Ready;
            *state = SinkState::Ready;
            changed
        });
    }

    /// Give up opening. A waiter receives `err` instead of [`TransportError::Closed`].
    pub fn fail(self, err: TransportError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
    }
}

impl Readiness {
    /// Readiness of a sink that needs no opening phase
    pub fn ready() -> Self {
        let (tx, rx) = watch::channel(SinkState::Ready);
        drop(tx);
        Self {
            rx,
            failure: FailureSlot::default(),
        }
    }

    pub fn state(&self) -> SinkState {
        *self.rx.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SinkState::Ready
    }

    /// Wait until the sink is open.
    ///
    /// Fails with the error passed to [`ReadySignal::fail`], taken by the first
    /// waiter only, or with [`TransportError::Closed`] when the sink gave up silently.
    pub async fn wait_ready(&mut self) -> Result<(), TransportError> {
        if self
            .rx
            .wait_for(|state| *state == SinkState::Ready)
            .await
            .is_ok()
        {
            return Ok(());
        }

        let failure = self.failure.lock().unwrap_or_else(|e| e.into_inner()).take();
        Err(failure.unwrap_or(TransportError::Closed))
    }
}
