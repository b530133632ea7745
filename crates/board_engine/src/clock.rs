//! Turn clock
//!
//! A single countdown for the active turn. The clock does not read time by
//! itself; the host feeds it elapsed durations via [`TurnClock::tick`] at a
//! fixed interval, which keeps it deterministic under test.
//!
//! # Lifecycle
//!
//! ```text
//! restart() ──► Running ──tick──► Running ──tick──► Expired (once)
//!                  │                                   │
//!                stop()                          (stays at zero,
//!                  ▼                              ticks return Idle)
//!                 Idle
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of advancing the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockTick {
    /// Stopped, or already expired for this turn
    Idle,
    /// Time left on the current turn
    Running(Duration),
    /// Reached zero on this tick
    Expired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnClock {
    limit: Duration,
    remaining: Duration,
    running: bool,
}

impl TurnClock {
    /// A stopped clock holding a full turn
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            remaining: limit,
            running: false,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Reset to a full turn and start counting
    pub fn restart(&mut self) {
        self.remaining = self.limit;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by `elapsed`
    ///
    /// Returns [`ClockTick::Expired`] exactly once per [`restart`](Self::restart).
    pub fn tick(&mut self, elapsed: Duration) -> ClockTick {
        if !self.running {
            return ClockTick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            ClockTick::Expired
        } else {
            ClockTick::Running(self.remaining)
        }
    }
}
