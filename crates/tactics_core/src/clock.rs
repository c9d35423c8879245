//! Simulation time and deadlines.
//!
//! Time never comes from the system clock. Callers pass the current
//! [`SimTime`] into every update, so tests can jump straight to a deadline.

use serde::{Deserialize, Serialize};

/// Simulation time in milliseconds.
pub type SimTime = u64;

/// One-shot countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimer {
    started_at: SimTime,
    limit_ms: u64,
    fired: bool,
}

impl TurnTimer {
    /// Start a countdown of `limit_ms` at `now`.
    #[must_use]
    pub const fn start(now: SimTime, limit_ms: u64) -> Self {
        Self {
            started_at: now,
            limit_ms,
            fired: false,
        }
    }

    /// Deadline.
    #[must_use]
    pub const fn deadline(&self) -> SimTime {
        self.started_at.saturating_add(self.limit_ms)
    }

    /// Milliseconds left at `now`, never negative.
    #[must_use]
    pub const fn remaining(&self, now: SimTime) -> u64 {
        self.deadline().saturating_sub(now)
    }

    /// Whether the timer already fired.
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }

    /// Returns `true` exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: SimTime) -> bool {
        if self.fired || now < self.deadline() {
            return false;
        }
        self.fired = true;
        true
    }
}
