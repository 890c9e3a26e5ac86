// Step scheduler - Edge-triggered playback over the loop cache
// Fires every step crossed since the previous poll exactly once

use crate::sequencer::cache::LoopCache;
use crate::sequencer::clock::{GridConfig, TransportState};
use crate::world::NotePlayer;

/// Per-track playback cursor
///
/// The scheduler never reads the note store, only the loop cache. Polling
/// iterates the whole range of steps crossed since the last poll, so a
/// coarse poll cadence (a dropped frame) cannot silently skip a note.
#[derive(Debug, Clone)]
pub struct StepScheduler {
    last_fired_step: i64,
    suspended: bool,
}

impl StepScheduler {
    /// Create a scheduler with the cursor before step zero
    pub fn new() -> Self {
        Self {
            last_fired_step: -1,
            suspended: false,
        }
    }

    /// Last step the cursor passed, -1 before the first poll
    pub fn last_fired_step(&self) -> i64 {
        self.last_fired_step
    }

    /// Stop emitting notes while remaining pollable
    /// The cursor keeps tracking the transport so no burst fires on resume
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Resume emitting notes
    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Check whether emission is suspended
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Reset the cursor to before step zero
    pub fn reset(&mut self) {
        self.last_fired_step = -1;
    }

    /// Poll the transport and fire all newly crossed steps
    ///
    /// `current_bin` selects which bin of the cache is audible this loop
    /// iteration. `remaining_phase_ms`, when set, trims note durations so
    /// nothing rings past the next phase boundary; durations are never
    /// extended. Returns the number of notes fired, in increasing step
    /// order.
    pub fn poll(
        &mut self,
        transport: &TransportState,
        grid: GridConfig,
        current_bin: u32,
        cache: &LoopCache,
        channel: u8,
        remaining_phase_ms: Option<f64>,
        player: &mut dyn NotePlayer,
    ) -> u32 {
        let current_step = transport.current_step(grid.steps_per_bin) as i64;

        if current_step == self.last_fired_step {
            return 0;
        }

        // A lower step than the cursor means the loop wrapped between
        // polls; re-arm from step zero of the new iteration.
        let first = if current_step < self.last_fired_step {
            0
        } else {
            self.last_fired_step + 1
        };

        let mut fired = 0;
        for step in first..=current_step {
            if step >= grid.steps_per_bin as i64 {
                break;
            }
            if let Some(note) = cache.note_at(current_bin, step as u32) {
                if self.suspended {
                    continue;
                }

                let mut duration_ms = transport.ticks_to_ms(note.duration_ticks);
                if let Some(remaining) = remaining_phase_ms {
                    duration_ms = duration_ms.min(remaining.max(0.0));
                }
                // Floor keeps a trimmed duration inside the boundary
                let duration_ms = duration_ms.floor() as u32;
                if duration_ms == 0 {
                    continue;
                }

                let velocity = (note.velocity * 127.0).round().clamp(1.0, 127.0) as u8;
                player.play(note.pitch, duration_ms, velocity, channel);
                fired += 1;
            }
        }

        self.last_fired_step = current_step;
        fired
    }
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new()
    }
}
