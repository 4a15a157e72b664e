/// Most ticks one [`FixedTimestep::accumulate`] call may report; time beyond
/// that is dropped.
pub const MAX_TICKS_PER_CALL: u32 = 240;

/// Fixed-rate tick accumulator.
///
/// Real frame time goes in, a whole number of ticks comes out; the remainder
/// carries into the next frame. No interpolation is done between ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f64,
    accumulator: f64,
}

impl FixedTimestep {
    /// # Panics
    /// Panics if `tick_rate` is not a positive finite number.
    #[track_caller]
    pub fn new(tick_rate: f64) -> Self {
        assert!(
            tick_rate.is_finite() && tick_rate > 0.0,
            "tick rate must be positive, got {tick_rate}"
        );
        Self { step: 1.0 / tick_rate, accumulator: 0.0 }
    }

    /// Seconds per tick.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried over to the next frame.
    pub fn remainder(&self) -> f64 {
        self.accumulator
    }

    /// Adds `dt` seconds and returns how many ticks are due, at most
    /// [`MAX_TICKS_PER_CALL`]. Negative and non-finite `dt` count as zero.
    pub fn accumulate(&mut self, dt: f64) -> u32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let limit = self.step * f64::from(MAX_TICKS_PER_CALL);
        self.accumulator += dt;
        if self.accumulator > limit {
            log::debug!(
                "fixed timestep: dropping {:.3}s of backlog",
                self.accumulator - limit
            );
            self.accumulator = limit;
        }

        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_carries_between_frames() {
        let mut fixed = FixedTimestep::new(10.0);
        assert_eq!(fixed.accumulate(0.25), 2);
        assert!((fixed.remainder() - 0.05).abs() < 1e-9);
        assert_eq!(fixed.accumulate(0.06), 1);
        assert!((fixed.remainder() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn short_frames_tick_nothing() {
        let mut fixed = FixedTimestep::new(60.0);
        assert_eq!(fixed.accumulate(0.001), 0);
        assert_eq!(fixed.accumulate(-1.0), 0);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut fixed = FixedTimestep::new(60.0);
        let ticks = fixed.accumulate(1.0e8);
        assert!(ticks <= MAX_TICKS_PER_CALL && ticks >= MAX_TICKS_PER_CALL - 1);
        assert!(fixed.remainder() < fixed.step());
        assert_eq!(fixed.accumulate(0.0), 0);
    }

    #[test]
    fn non_finite_dt_ticks_nothing() {
        let mut fixed = FixedTimestep::new(60.0);
        assert_eq!(fixed.accumulate(f64::INFINITY), 0);
        assert_eq!(fixed.accumulate(f64::NAN), 0);
        assert_eq!(fixed.remainder(), 0.0);
        assert_eq!(fixed.accumulate(1.0 / 30.0 + 1e-9), 2);
    }

    #[test]
    #[should_panic(expected = "tick rate must be positive")]
    fn zero_rate_panics() {
        FixedTimestep::new(0.0);
    }
}
