//! Wall-clock sources
//!
//! The scheduler reads the time through [`ClockSource`] so tests can drive it
//! with [`ManualClock`] or a closure instead of the system clock.

use chrono::{Duration, Local, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// Source of the current local wall-clock time
pub trait ClockSource: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

impl ClockSource for Box<dyn ClockSource> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// System clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, time: NaiveDateTime) {
        *self.lock() = time;
    }

    /// Move forward by `step`
    pub fn advance(&self, step: Duration) {
        let mut now = self.lock();
        *now += step;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned lock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

/// Clock backed by a closure, see [`from_fn`]
pub struct FnClock<F>(F);

/// Build a clock from a closure returning the current time
pub fn from_fn<F>(f: F) -> FnClock<F>
where
    F: Fn() -> NaiveDateTime + Send + Sync,
{
    FnClock(f)
}

impl<F> ClockSource for FnClock<F>
where
    F: Fn() -> NaiveDateTime + Send + Sync,
{
    fn now(&self) -> NaiveDateTime {
        (self.0)()
    }
}
