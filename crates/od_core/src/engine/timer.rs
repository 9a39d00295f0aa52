//! Escape countdown
//!
//! Started when the last target falls. `tick` only counts down while
//! running and reports expiry exactly once.

#[derive(Debug, Clone, Default)]
pub struct EscapeTimer {
    duration: f32,
    remaining: f32,
    running: bool,
    started: bool,
}

impl EscapeTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
        self.running = true;
        self.started = true;
    }

    /// Stops and forgets the last countdown
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Advances by `dt`; true on the tick the countdown reaches zero
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.running = false;
            return true;
        }
        false
    }

    /// Elapsed share of the countdown in [0, 1]; 0 when never started
    pub fn fraction_elapsed(&self) -> f32 {
        if !self.started {
            return 0.0;
        }
        if self.duration <= f32::EPSILON {
            return 1.0;
        }
        (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_never_expires() {
        let mut t = EscapeTimer::new();
        assert!(!t.tick(100.0));
        assert_eq!(t.fraction_elapsed(), 0.0);
    }

    #[test]
    fn test_expires_once() {
        let mut t = EscapeTimer::new();
        t.start(0.05);
        assert!(!t.tick(0.02));
        assert!(!t.tick(0.02));
        assert!(t.tick(0.02));
        assert!(!t.tick(0.02));
        assert!(!t.is_running());
        assert_eq!(t.remaining(), 0.0);
    }

    #[test]
    fn test_zero_duration_fires_on_first_tick() {
        let mut t = EscapeTimer::new();
        t.start(0.0);
        assert_eq!(t.fraction_elapsed(), 1.0);
        assert!(t.tick(0.02));
    }

    #[test]
    fn test_fraction_elapsed() {
        let mut t = EscapeTimer::new();
        t.start(10.0);
        t.tick(2.5);
        assert!((t.fraction_elapsed() - 0.25).abs() < 1e-6);
        t.stop();
        assert!(!t.tick(1.0));
        assert!((t.fraction_elapsed() - 0.25).abs() < 1e-6);

        t.reset();
        assert_eq!(t.fraction_elapsed(), 0.0);
    }
}
