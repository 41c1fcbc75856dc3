//! Simulation time state.
//!
//! The [`Clock`] is the single source of truth for time inside the runtime.
//! Behaviours never read the wall clock directly; the scheduler advances the
//! clock once per iteration and every consumer observes the same simulated
//! time for the whole frame.

use std::time::Duration;

/// Default fixed simulation step: 120 Hz.
pub const DEFAULT_FIXED_STEP: Duration = Duration::from_nanos(8_333_333);

/// Accumulated simulation time for one scheduler instance.
///
/// Tracks two notions of time: `time`, which advances by the measured
/// wall-clock delta each frame, and `fixed_time`, which only ever advances
/// in whole multiples of the fixed step and trails `time` by less than one
/// step after each catch-up drain.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Simulated time since the clock started.
    time: Duration,
    /// Simulated time as of the previous frame.
    last_time: Duration,
    /// Time consumed by fixed-rate updates, a multiple of `fixed_step`.
    fixed_time: Duration,
    /// Constant fixed-rate step size.
    fixed_step: Duration,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP)
    }
}

impl Clock {
    /// Create a clock with the given fixed step size.
    pub fn new(fixed_step: Duration) -> Self {
        Self {
            time: Duration::ZERO,
            last_time: Duration::ZERO,
            fixed_time: Duration::ZERO,
            fixed_step,
        }
    }

    /// Reset all accumulated time to zero, keeping the fixed step.
    pub fn reset(&mut self) {
        self.time = Duration::ZERO;
        self.last_time = Duration::ZERO;
        self.fixed_time = Duration::ZERO;
    }

    /// The variable-rate delta for the current frame, in seconds.
    pub fn delta_time(&self) -> f32 {
        (self.time - self.last_time).as_secs_f32()
    }

    /// The unchanging delta applied on each fixed-rate update, in seconds.
    pub fn fixed_delta_time(&self) -> f32 {
        self.fixed_step.as_secs_f32()
    }

    /// Simulated time since the clock started, in seconds.
    pub fn time(&self) -> f32 {
        self.time.as_secs_f32()
    }

    /// Time consumed by fixed-rate updates so far, in seconds.
    pub fn fixed_time(&self) -> f32 {
        self.fixed_time.as_secs_f32()
    }

    /// The fixed step size.
    pub fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    /// Advance simulated time by a measured wall-clock delta.
    pub(crate) fn advance(&mut self, elapsed: Duration) {
        self.last_time = self.time;
        self.time += elapsed;
    }

    /// True while a whole fixed step still fits between fixed and simulated
    /// time. Drives the catch-up loop so that `fixed_time` ends each drain at
    /// the largest step multiple that does not exceed `time`.
    pub(crate) fn fixed_behind(&self) -> bool {
        self.fixed_time + self.fixed_step <= self.time
    }

    /// Advance fixed time by exactly one step.
    pub(crate) fn advance_fixed(&mut self) {
        self.fixed_time += self.fixed_step;
    }
}
