// Clock - Step grid addressing and transport quantization
// Handles conversion between continuous playback position and discrete steps

use std::fmt;

/// Step grid configuration for one track
///
/// A bin is one full repetition of the base step grid. `bin_count` is the
/// loop multiplier: it may grow while a phase plays and is reset to 1 at
/// every phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    pub steps_per_bin: u32,
    pub bin_count: u32,
}

impl GridConfig {
    /// Creates a new grid configuration
    pub fn new(steps_per_bin: u32, bin_count: u32) -> Self {
        assert!(steps_per_bin > 0, "Grid must have at least one step per bin");
        assert!(bin_count > 0, "Grid must have at least one bin");
        Self {
            steps_per_bin,
            bin_count,
        }
    }

    /// Total number of addressable global steps
    pub fn total_steps(&self) -> u32 {
        self.steps_per_bin * self.bin_count
    }

    /// Bin index of a global step
    pub fn bin_of(&self, global_step: u32) -> u32 {
        global_step / self.steps_per_bin
    }

    /// Step index within its bin
    pub fn local_step_of(&self, global_step: u32) -> u32 {
        global_step % self.steps_per_bin
    }

    /// Check whether a global step is addressable under this grid
    pub fn contains(&self, global_step: u32) -> bool {
        global_step < self.total_steps()
    }

    /// Same grid with a different loop multiplier
    pub fn with_bin_count(self, bin_count: u32) -> Self {
        Self::new(self.steps_per_bin, bin_count)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(16, 1)
    }
}

impl fmt::Display for GridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.steps_per_bin, self.bin_count)
    }
}

/// Transport snapshot read from the external playback source
///
/// `position_ticks` resets at every loop iteration; the bin index advances
/// once per wrap and is tracked by the caller, not here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportState {
    /// Playback position within the current loop iteration, in ticks
    pub position_ticks: u64,
    /// Length of one loop iteration (one bin), in ticks
    pub loop_length_ticks: u64,
    /// Duration of one tick in milliseconds
    pub ms_per_tick: f64,
}

impl TransportState {
    /// Creates a transport snapshot at position zero
    pub fn new(loop_length_ticks: u64, ms_per_tick: f64) -> Self {
        assert!(loop_length_ticks > 0, "Loop length must be > 0 ticks");
        assert!(ms_per_tick > 0.0, "Tick duration must be > 0 ms");
        Self {
            position_ticks: 0,
            loop_length_ticks,
            ms_per_tick,
        }
    }

    /// Quantized step for the current position
    pub fn current_step(&self, steps_per_bin: u32) -> u32 {
        snap_to_step(
            self.position_ticks as f64,
            self.loop_length_ticks as f64,
            steps_per_bin,
        )
    }

    /// Duration of one loop iteration in seconds
    pub fn loop_length_secs(&self) -> f64 {
        self.loop_length_ticks as f64 * self.ms_per_tick / 1000.0
    }

    /// Convert a tick count to milliseconds
    pub fn ticks_to_ms(&self, ticks: u32) -> f64 {
        ticks as f64 * self.ms_per_tick
    }
}

/// Quantize a continuous playback position to a discrete step index
///
/// Rounding is `floor((position + step_size / 2) / step_size)`, which breaks
/// ties at exact half-step boundaries toward the lower index. The result is
/// clamped to `[0, total_steps - 1]` for any non-negative position,
/// including positions at or past the loop length.
pub fn snap_to_step(position: f64, loop_length: f64, total_steps: u32) -> u32 {
    assert!(total_steps >= 1, "Grid must have at least one step");

    let step_size = loop_length / total_steps as f64;
    if !step_size.is_finite() || step_size <= 0.0 {
        return 0;
    }

    let step = ((position + step_size / 2.0) / step_size).floor();
    if !step.is_finite() {
        return 0;
    }
    (step as i64).clamp(0, total_steps as i64 - 1) as u32
}
