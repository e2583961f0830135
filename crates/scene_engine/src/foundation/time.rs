//! Time management utilities

use std::time::{Duration, Instant};

/// Frame clock owned by the host loop
///
/// Produces the monotonically increasing frame counter that entities use for
/// creation stamps and cadence checks, plus an instantaneous frame rate for the
/// debug overlay.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock at frame zero
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance one frame using wall-clock time
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed.as_secs_f32());
    }

    /// Advance one frame by a fixed step (headless and deterministic runs)
    pub fn tick_fixed(&mut self, step: Duration) {
        self.last_frame = Instant::now();
        self.advance(step.as_secs_f32());
    }

    fn advance(&mut self, delta: f32) {
        self.delta_time = delta;
        self.total_time += delta;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Wall-clock timer measuring a whole run
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start timing now
    pub fn start_new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time since start
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since start in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_tick_counts_frames() {
        let mut clock = FrameClock::new();
        for _ in 0..3 {
            clock.tick_fixed(Duration::from_millis(20));
        }

        assert_eq!(clock.frame_count(), 3);
        assert_relative_eq!(clock.current_fps(), 50.0, epsilon = 1e-3);
        assert_relative_eq!(clock.total_time(), 0.06, epsilon = 1e-5);
    }

    #[test]
    fn test_fresh_clock_reports_zero_fps() {
        let clock = FrameClock::new();
        assert_eq!(clock.current_fps(), 0.0);
        assert_eq!(clock.average_fps(), 0.0);
    }
}
