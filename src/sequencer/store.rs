// Note store - Persistent per-track record of what plays at which step
// Sparse, authoritative, and the only source the loop cache derives from

use crate::sequencer::clock::GridConfig;
use crate::sequencer::note::ScheduledNote;
use std::collections::HashMap;

/// Sparse mapping from global step to scheduled note for one track
///
/// The store is authoritative: playback never reads it directly, only the
/// loop cache derived from it. Every mutation sets a dirty flag; the cache
/// clears the flag after a full rebuild. Bulk mutation from outside the
/// owning track is reserved for the phase bridge while the track's
/// scheduler is frozen.
#[derive(Debug, Clone)]
pub struct NoteStore {
    notes: HashMap<u32, ScheduledNote>,
    grid: GridConfig,
    dirty: bool,
}

impl NoteStore {
    /// Create an empty store for the given grid
    pub fn new(grid: GridConfig) -> Self {
        Self {
            notes: HashMap::new(),
            grid,
            // Dirty from the start so the first cache read builds
            dirty: true,
        }
    }

    /// Grid currently governing the valid step range
    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    /// Replace the grid (loop multiplier growth or phase-boundary reset)
    ///
    /// Notes authored beyond the new range stay in the store but are
    /// excluded from the cache until the range grows back.
    pub fn set_grid(&mut self, grid: GridConfig) {
        if grid != self.grid {
            self.grid = grid;
            self.dirty = true;
        }
    }

    /// Insert a note at its global step, replacing any previous note there
    ///
    /// Steps outside the grid range are rejected with a warning and the
    /// store is left untouched. Returns whether the note was stored.
    pub fn insert(&mut self, note: ScheduledNote) -> bool {
        if !self.grid.contains(note.global_step) {
            log::warn!(
                "rejecting note at step {} outside grid {} ({} steps)",
                note.global_step,
                self.grid,
                self.grid.total_steps()
            );
            return false;
        }

        self.notes.insert(note.global_step, note);
        self.dirty = true;
        true
    }

    /// Remove the note at a global step, if present
    pub fn remove_at_step(&mut self, global_step: u32) -> Option<ScheduledNote> {
        let removed = self.notes.remove(&global_step);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Empty the store
    pub fn clear(&mut self) {
        if !self.notes.is_empty() {
            self.notes.clear();
        }
        self.dirty = true;
    }

    /// Note at a global step, if any
    pub fn get(&self, global_step: u32) -> Option<&ScheduledNote> {
        self.notes.get(&global_step)
    }

    /// Iterate notes in unspecified order
    pub fn notes(&self) -> impl Iterator<Item = &ScheduledNote> {
        self.notes.values()
    }

    /// Number of stored notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if the store holds no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Whether the derived cache is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge a completed cache rebuild
    /// Called by the loop cache only, after a full compute-then-swap
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
