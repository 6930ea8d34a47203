//! Submission time source.
//!
//! Timestamps are assigned server-side at evaluation time; callers never
//! supply one. The trait exists so tests can pin or advance time.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// Source of the submission timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Test use.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}
