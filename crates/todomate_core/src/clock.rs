//! Wall-clock source.
//!
//! Services and the dashboard read "now" through [`Clock`] so week navigation
//! and `created_at` stamps stay deterministic under test.

use chrono::Utc;

pub trait Clock: Send + Sync {
    /// Current Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}
