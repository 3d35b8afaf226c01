//! Clock abstraction so commands can stamp events with an injectable time.

use chrono::{DateTime, Utc};

/// Abstracts "now" so tests can fix time instead of racing the wall clock.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock: the real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
