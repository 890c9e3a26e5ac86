// Timing window - Judges whether a real-time action lands on beat
// Continuous-clock math, independent of the tick-driven scheduler

/// Tolerance configuration for action judgment
///
/// The accepted window around a step's ideal time is
/// `step_duration * tolerance_steps * 0.5` on either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowConfig {
    pub tolerance_steps: f32,
}

impl WindowConfig {
    /// Creates a window configuration
    pub fn new(tolerance_steps: f32) -> Self {
        assert!(tolerance_steps > 0.0, "Tolerance must be > 0 steps");
        Self { tolerance_steps }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Outcome of judging one player action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionJudgment {
    /// The action is credited to the best-matching eligible step
    Hit { step: u32, delta_secs: f64 },
    /// No eligible step within tolerance; a normal outcome, not an error
    Miss,
}

impl ActionJudgment {
    /// Check whether the action was credited
    pub fn is_hit(&self) -> bool {
        matches!(self, ActionJudgment::Hit { .. })
    }
}

/// Matches real-time actions against eligible target steps
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingJudge {
    config: WindowConfig,
}

impl TimingJudge {
    /// Creates a judge with the given tolerance
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Current tolerance configuration
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// Phase of `now` within the loop, in `[0, loop_length)`
    ///
    /// `loop_start_anchor` is the clock time at which some loop iteration
    /// began; any past iteration works since the phase is modular.
    pub fn loop_phase(now: f64, loop_start_anchor: f64, loop_length: f64) -> f64 {
        let loops_completed = ((now - loop_start_anchor) / loop_length).floor();
        let current_loop_start = loop_start_anchor + loops_completed * loop_length;
        let mut t_pos = (now - current_loop_start) % loop_length;
        if t_pos < 0.0 {
            // Floating error can land a hair below zero
            t_pos += loop_length;
        }
        t_pos
    }

    /// Judge an action at clock time `now` against eligible steps
    ///
    /// Deltas wrap around the loop edge, so an action just after the loop
    /// boundary can still be credited to a step near time zero. The best
    /// match is the smallest wrapped delta strictly inside the window.
    pub fn judge(
        &self,
        now: f64,
        loop_start_anchor: f64,
        loop_length: f64,
        total_steps: u32,
        eligible_steps: &[u32],
    ) -> ActionJudgment {
        if loop_length <= 0.0 || total_steps == 0 || eligible_steps.is_empty() {
            return ActionJudgment::Miss;
        }

        let step_duration = loop_length / total_steps as f64;
        let window = step_duration * self.config.tolerance_steps as f64 * 0.5;
        let t_pos = Self::loop_phase(now, loop_start_anchor, loop_length);

        let mut best: Option<(u32, f64)> = None;
        for &step in eligible_steps {
            let ideal_time = (step as f64 * step_duration) % loop_length;
            let raw_delta = (ideal_time - t_pos).abs();
            let wrap_delta = raw_delta.min(loop_length - raw_delta);

            if wrap_delta < window {
                match best {
                    Some((_, best_delta)) if best_delta <= wrap_delta => {}
                    _ => best = Some((step, wrap_delta)),
                }
            }
        }

        match best {
            Some((step, delta_secs)) => ActionJudgment::Hit { step, delta_secs },
            None => ActionJudgment::Miss,
        }
    }
}
