//! Time management utilities

use std::cell::Cell;
use std::time::Instant;

/// Fixed simulation step used by the physics world (60 Hz)
pub const FIXED_STEP: f32 = 1.0 / 60.0;

/// Frame clock shared through the engine context
///
/// Counts completed frames and measures wall-clock delta between them.
/// The simulation itself always advances by [`FIXED_STEP`].
pub struct FrameClock {
    frame: Cell<u64>,
    last_frame: Cell<Instant>,
    delta_time: Cell<f32>,
    fixed_step: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(FIXED_STEP)
    }
}

impl FrameClock {
    /// Create a clock that advances the simulation by `fixed_step` seconds per frame
    pub fn new(fixed_step: f32) -> Self {
        Self {
            frame: Cell::new(0),
            last_frame: Cell::new(Instant::now()),
            delta_time: Cell::new(0.0),
            fixed_step,
        }
    }

    /// Mark the end of a frame
    pub fn tick(&self) {
        let now = Instant::now();
        self.delta_time.set(now.duration_since(self.last_frame.get()).as_secs_f32());
        self.last_frame.set(now);
        self.frame.set(self.frame.get() + 1);
    }

    /// Number of frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Wall-clock duration of the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time.get()
    }

    /// Simulation step in seconds
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }
}
