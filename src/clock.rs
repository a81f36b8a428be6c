//! Monotonic clock seam for the session tracker
//!
//! The tracker reads time through the `MonotonicClock` trait so that hosts
//! and recorded-session replay control the timeline. `SystemClock` is the
//! default for live tracking; `ManualClock` is settable and shared between a
//! driver and the tracker it drives.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonic time in milliseconds.
pub trait MonotonicClock {
    /// Current monotonic time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Process-monotonic clock anchored at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock reading 0.0 at the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for recorded-session replay and tests.
///
/// Clones share the same underlying time, so a replay driver keeps one
/// handle while the tracker owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock reading 0.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock reading `t_ms`.
    pub fn starting_at(t_ms: f64) -> Self {
        let clock = Self::default();
        clock.set(t_ms);
        clock
    }

    /// Set the current time. Moving backwards is allowed; the tracker's
    /// guards absorb it as clock noise.
    pub fn set(&self, t_ms: f64) {
        self.now.set(t_ms);
    }

    /// Advance the current time by `dt_ms`.
    pub fn advance(&self, dt_ms: f64) {
        self.now.set(self.now.get() + dt_ms);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
