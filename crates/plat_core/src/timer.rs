//! Countdown timer shared by weapon cooldowns, damage flashes, death delays
//! and animation clocks.
//!
//! A timer accumulates elapsed seconds. When elapsed time reaches the
//! configured duration, `step` reports the crossing, wraps elapsed time back
//! by one duration, and latches `is_timed_out` until `reset` is called.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
    timed_out: bool,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            timed_out: false,
        }
    }

    /// Advance by `dt` seconds. Returns true on the step that crosses the duration.
    pub fn step(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.elapsed -= self.duration;
            self.timed_out = true;
            return true;
        }
        false
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.timed_out = false;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
