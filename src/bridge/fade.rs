// Linear fade - Volume ramp used by the phase bridge
// One value object serves both the fade-out and the fade-in legs

/// Linear interpolation from a start gain to a target gain over a duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFade {
    from: f32,
    to: f32,
    duration_secs: f32,
    elapsed_secs: f32,
}

impl LinearFade {
    /// Creates a fade; a zero duration completes immediately
    pub fn new(from: f32, to: f32, duration_secs: f32) -> Self {
        assert!(duration_secs >= 0.0, "Fade duration must not be negative");
        Self {
            from,
            to,
            duration_secs,
            elapsed_secs: 0.0,
        }
    }

    /// Advance the fade clock
    pub fn advance(&mut self, dt_secs: f32) {
        self.elapsed_secs = (self.elapsed_secs + dt_secs).min(self.duration_secs);
    }

    /// Current interpolated value
    /// Returns exactly `to` once the duration has elapsed
    pub fn value(&self) -> f32 {
        if self.elapsed_secs >= self.duration_secs {
            return self.to;
        }
        let t = self.elapsed_secs / self.duration_secs;
        self.from + (self.to - self.from) * t
    }

    /// Check whether the fade reached its target
    pub fn is_finished(&self) -> bool {
        self.elapsed_secs >= self.duration_secs
    }

    /// Target value of the fade
    pub fn target(&self) -> f32 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_midpoint() {
        let mut fade = LinearFade::new(1.0, 0.0, 2.0);
        fade.advance(1.0);

        assert!((fade.value() - 0.5).abs() < 1e-6);
        assert!(!fade.is_finished());
    }

    #[test]
    fn test_fade_endpoint_exact() {
        let mut fade = LinearFade::new(0.8, 0.0, 1.5);

        // Uneven step partitioning must still land exactly on the target
        fade.advance(0.7);
        fade.advance(0.7);
        fade.advance(0.2);

        assert!(fade.is_finished());
        assert_eq!(fade.value(), 0.0);
    }

    #[test]
    fn test_fade_overshoot_clamps() {
        let mut fade = LinearFade::new(0.0, 0.9, 1.0);
        fade.advance(5.0);

        assert!(fade.is_finished());
        assert_eq!(fade.value(), 0.9);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let fade = LinearFade::new(0.3, 0.7, 0.0);

        assert!(fade.is_finished());
        assert_eq!(fade.value(), 0.7);
    }
}
