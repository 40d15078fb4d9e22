/// Seconds skipped at startup, so the first frame does not show every particle born at once.
pub const DEFAULT_WARMUP: f32 = 3.0;

/// Simulation time fed to the shader.
///
/// Advances by wall-clock frame deltas unless paused. Time only ever grows,
/// so particle loops never run backwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimClock {
    warmup: f64,
    /// Accumulated in `f64` so long runs keep sub-frame resolution.
    seconds: f64,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP)
    }
}

impl SimClock {
    pub fn new(warmup: f32) -> Self {
        let warmup = f64::from(if warmup.is_finite() { warmup.max(0.0) } else { DEFAULT_WARMUP });
        Self {
            warmup,
            seconds: warmup,
            paused: false,
        }
    }

    /// Adds `dt` seconds unless paused. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.seconds += f64::from(dt);
    }

    #[inline]
    pub fn seconds(&self) -> f32 {
        self.seconds as f32
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Flips the pause state and returns the new one.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Back to the warm-up offset; the pause state is kept.
    pub fn reset(&mut self) {
        self.seconds = self.warmup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_warmup() {
        assert_eq!(SimClock::default().seconds(), 3.0);
        assert_eq!(SimClock::new(0.0).seconds(), 0.0);
        assert_eq!(SimClock::new(-2.0).seconds(), 0.0);
    }

    #[test]
    fn advance_accumulates() {
        let mut c = SimClock::new(1.0);
        c.advance(0.25);
        c.advance(0.5);
        assert_eq!(c.seconds(), 1.75);
    }

    #[test]
    fn paused_clock_holds() {
        let mut c = SimClock::default();
        c.set_paused(true);
        c.advance(1.0);
        assert_eq!(c.seconds(), 3.0);
        assert!(!c.toggle_pause());
        c.advance(1.0);
        assert_eq!(c.seconds(), 4.0);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut c = SimClock::default();
        c.advance(-1.0);
        c.advance(f32::NAN);
        c.advance(f32::INFINITY);
        assert_eq!(c.seconds(), 3.0);
    }

    #[test]
    fn long_runs_keep_frame_resolution() {
        let mut c = SimClock::new(0.0);
        // 20 hours of 60 fps frames, then one more frame.
        c.advance(20.0 * 3600.0);
        let before = c.seconds();
        for _ in 0..60 {
            c.advance(1.0 / 60.0);
        }
        let after = c.seconds();
        assert!((after - before - 1.0).abs() < 0.01, "advanced {}", after - before);
    }

    #[test]
    fn reset_keeps_pause_state() {
        let mut c = SimClock::default();
        c.advance(5.0);
        c.set_paused(true);
        c.reset();
        assert_eq!(c.seconds(), 3.0);
        assert!(c.is_paused());
    }
}
