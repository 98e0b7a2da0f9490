use std::time::{Duration, Instant};

/// Frame timing snapshot handed to every frame task.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// A snapshot with an explicit delta, for hosts and tests that drive
    /// frames themselves.
    pub fn with_dt(dt: f32, frame_index: u64) -> Self {
        Self {
            dt,
            now: Instant::now(),
            frame_index,
        }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so a stalled or backgrounded host produces one
/// bounded step instead of a huge one.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock clamping `dt` to `[100µs, 250ms]`.
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the clock baseline, e.g. when the host resumes.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock to now.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// A `now` earlier than the previous tick counts as zero elapsed time
    /// (then clamped to the minimum).
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
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
    fn regular_frames_report_elapsed_time() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.tick_at(start);

        let ft = clock.tick_at(start + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn long_stall_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.tick_at(start);

        let ft = clock.tick_at(start + Duration::from_secs(30));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn backwards_time_is_clamped_to_minimum() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new();
        clock.tick_at(start);

        let ft = clock.tick_at(start - Duration::from_millis(5));
        assert!((ft.dt - 0.0001).abs() < 1e-7);
    }
}
