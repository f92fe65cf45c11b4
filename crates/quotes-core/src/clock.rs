//! Time sources for cache freshness checks.

use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Source of the current time.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that reports the system time shifted by an adjustable offset.
///
/// Files written to disk still carry real modification times, so shifting
/// this clock forward ages every cache entry at once.
#[derive(Debug, Default)]
pub struct ManualClock {
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock with no offset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        SystemTime::now() + offset
    }
}

/// Returns true if an entry created at `created_at` is still usable at `now`.
///
/// The window is exclusive: an entry exactly `window` old is expired. A
/// creation time in the future counts as age zero.
#[must_use]
pub fn is_fresh(created_at: SystemTime, now: SystemTime, window: Duration) -> bool {
    let age = now.duration_since(created_at).unwrap_or(Duration::ZERO);
    age < window
}
