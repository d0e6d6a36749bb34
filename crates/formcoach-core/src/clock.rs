// ABOUTME: Monotonic guard for frame timestamps driving FSM timing, throttling, and expiry
// ABOUTME: Clamps out-of-order timestamps to the last observed value and reports regressions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-session clock fed by frame timestamps.
///
/// Timestamps are trusted to be non-decreasing. When one goes backwards (clock skew,
/// reordered delivery) the previous value is reused so elapsed times never turn negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonotonicClock {
    last: Option<f64>,
}

impl MonotonicClock {
    /// Create a clock that has not observed any timestamp yet
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Observe a timestamp and return the effective (clamped) value
    pub fn observe(&mut self, timestamp: f64) -> f64 {
        if !timestamp.is_finite() {
            return self.last.unwrap_or(0.0);
        }
        match self.last {
            Some(last) if timestamp < last => {
                warn!(
                    timestamp,
                    last_seen = last,
                    "Out-of-order timestamp clamped to last observed value"
                );
                last
            }
            _ => {
                self.last = Some(timestamp);
                timestamp
            }
        }
    }

    /// Last effective timestamp, if any
    #[must_use]
    pub const fn last(&self) -> Option<f64> {
        self.last
    }

    /// Forget all observed timestamps
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_backwards_timestamps() {
        let mut clock = MonotonicClock::new();
        assert!((clock.observe(5.0) - 5.0).abs() < f64::EPSILON);
        assert!((clock.observe(3.0) - 5.0).abs() < f64::EPSILON);
        assert!((clock.observe(7.5) - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_timestamp_reuses_last() {
        let mut clock = MonotonicClock::new();
        clock.observe(2.0);
        assert!((clock.observe(f64::NAN) - 2.0).abs() < f64::EPSILON);
        assert_eq!(clock.last(), Some(2.0));
    }
}
