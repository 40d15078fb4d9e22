use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds (clamped).
    pub dt: f32,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped: the lower bound keeps tight loops from reporting
/// zero, the upper bound keeps a debugger pause or a minimized window from
/// jumping the animation forward by seconds at once.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self::starting_at(Instant::now(), dt_min, dt_max)
    }

    fn starting_at(start: Instant, dt_min: Duration, dt_max: Duration) -> Self {
        Self {
            last: start,
            dt_min,
            dt_max,
        }
    }

    /// Resets the baseline so the next tick measures from now.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        FrameTime {
            dt: dt.as_secs_f32(),
        }
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

    fn clock_at(start: Instant) -> FrameClock {
        FrameClock::starting_at(start, FrameClock::DEFAULT_DT_MIN, FrameClock::DEFAULT_DT_MAX)
    }

    #[test]
    fn reports_elapsed_seconds() {
        let start = Instant::now();
        let mut clock = clock_at(start);
        let ft = clock.tick_at(start + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn long_stall_is_clamped() {
        let start = Instant::now();
        let mut clock = clock_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn zero_interval_is_clamped_up() {
        let start = Instant::now();
        let mut clock = clock_at(start);
        let ft = clock.tick_at(start);
        assert!(ft.dt > 0.0);
    }

    #[test]
    fn consecutive_ticks_measure_from_previous() {
        let start = Instant::now();
        let mut clock = clock_at(start);
        clock.tick_at(start + Duration::from_millis(10));
        let b = clock.tick_at(start + Duration::from_millis(30));
        assert!((b.dt - 0.020).abs() < 1e-6);
    }
}
