//! Frame timing for a frame-locked render loop.

use std::time::Duration;

use web_time::Instant;

/// Keeps track of the time since startup and the duration of the last frame.
pub struct FrameClock {
    start_time: Instant,
    last_frame: Instant,
    frames: u64,
}

impl FrameClock {
    /// Starts a new clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            frames: 0,
        }
    }

    /// Marks the beginning of a new frame and returns the time passed since the previous one.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frames += 1;
        delta
    }

    /// Time between the creation of the clock and the most recent tick.
    ///
    /// This stays constant during a frame, so everything animated within one frame agrees on the time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last_frame.saturating_duration_since(self.start_time)
    }

    /// Number of ticks so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_measures_time_between_frames() {
        let mut clock = FrameClock::new();
        let start = clock.start_time;

        let delta = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(delta, Duration::from_millis(16), "first frame");

        let delta = clock.tick_at(start + Duration::from_millis(40));
        assert_eq!(delta, Duration::from_millis(24), "second frame");
        assert_eq!(clock.frames(), 2, "two ticks");
        assert_eq!(clock.elapsed(), Duration::from_millis(40), "elapsed up to the last tick");
    }

    #[test]
    fn going_back_in_time_yields_zero_delta() {
        let mut clock = FrameClock::new();
        let start = clock.start_time;
        clock.tick_at(start + Duration::from_millis(10));

        let delta = clock.tick_at(start);
        assert_eq!(delta, Duration::ZERO, "saturating");
    }
}
