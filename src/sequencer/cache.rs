// Loop cache - Derived playback index over the note store
// Rebuilt in full whenever the store reports itself dirty

use crate::sequencer::store::NoteStore;
use std::collections::HashMap;

/// One playable entry of the loop cache, addressed by bin and local step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedNote {
    pub bin: u32,
    pub local_step: u32,
    pub pitch: u8,
    pub duration_ticks: u32,
    pub velocity: f32,
    pub authored_root_pitch: u8,
}

/// Lookup index mapping `(bin, local_step)` to a playable note
///
/// The cache is a pure function of the store contents and its grid. A
/// rebuild is all-or-nothing: a fresh index is computed first and swapped
/// in whole, so a reader between polls never observes a half-built state.
#[derive(Debug, Clone, Default)]
pub struct LoopCache {
    entries: HashMap<(u32, u32), CachedNote>,
}

impl LoopCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the store if it is dirty
    ///
    /// Entries whose bin exceeds the current bin count are dropped with a
    /// warning; this happens when the loop multiplier shrank after notes
    /// were authored against a larger value. Returns whether a rebuild ran;
    /// a second call with no intervening mutation is a no-op.
    pub fn rebuild_if_dirty(&mut self, store: &mut NoteStore) -> bool {
        if !store.is_dirty() {
            return false;
        }

        let grid = store.grid();
        let mut fresh = HashMap::with_capacity(store.len());
        let mut dropped = 0usize;

        for note in store.notes() {
            let bin = grid.bin_of(note.global_step);
            if bin >= grid.bin_count {
                dropped += 1;
                continue;
            }
            let local_step = grid.local_step_of(note.global_step);
            fresh.insert(
                (bin, local_step),
                CachedNote {
                    bin,
                    local_step,
                    pitch: note.pitch,
                    duration_ticks: note.duration_ticks,
                    velocity: note.velocity,
                    authored_root_pitch: note.authored_root_pitch,
                },
            );
        }

        if dropped > 0 {
            log::warn!(
                "loop cache rebuild dropped {} note(s) beyond bin count {}",
                dropped,
                grid.bin_count
            );
        }

        self.entries = fresh;
        store.mark_clean();
        true
    }

    /// Note scheduled at a bin and local step, if any
    pub fn note_at(&self, bin: u32, local_step: u32) -> Option<&CachedNote> {
        self.entries.get(&(bin, local_step))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by `(bin, local_step)` for snapshots and replay
    pub fn entries_sorted(&self) -> Vec<CachedNote> {
        let mut entries: Vec<CachedNote> = self.entries.values().copied().collect();
        entries.sort_by_key(|e| (e.bin, e.local_step));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::clock::GridConfig;
    use crate::sequencer::note::ScheduledNote;

    #[test]
    fn test_round_trip() {
        let mut store = NoteStore::new(GridConfig::new(32, 4));
        store.insert(ScheduledNote::new(37, 60, 4, 100.0 / 127.0, 60));

        let mut cache = LoopCache::new();
        assert!(cache.rebuild_if_dirty(&mut store));

        // 37 / 32 = bin 1, 37 % 32 = local step 5
        assert_eq!(cache.len(), 1);
        let entry = cache.note_at(1, 5).unwrap();
        assert_eq!(entry.bin, 1);
        assert_eq!(entry.local_step, 5);
        assert_eq!(entry.pitch, 60);
        assert_eq!(entry.duration_ticks, 4);
    }

    #[test]
    fn test_rebuild_idempotent() {
        let mut store = NoteStore::new(GridConfig::new(16, 2));
        store.insert(ScheduledNote::new(3, 64, 2, 0.7, 60));
        store.insert(ScheduledNote::new(20, 67, 2, 0.7, 60));

        let mut cache = LoopCache::new();
        assert!(cache.rebuild_if_dirty(&mut store));
        let first = cache.entries_sorted();

        // No mutation in between: the second call must not rebuild
        assert!(!cache.rebuild_if_dirty(&mut store));
        assert_eq!(cache.entries_sorted(), first);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_shrunk_bin_count_drops_entries() {
        let mut store = NoteStore::new(GridConfig::new(16, 4));
        store.insert(ScheduledNote::new(2, 60, 2, 0.8, 60));
        store.insert(ScheduledNote::new(50, 72, 2, 0.8, 60));

        // Loop multiplier reset while the high note is still stored
        store.set_grid(GridConfig::new(16, 1));

        let mut cache = LoopCache::new();
        cache.rebuild_if_dirty(&mut store);

        assert_eq!(cache.len(), 1);
        assert!(cache.note_at(0, 2).is_some());
        assert!(cache.note_at(3, 2).is_none());
    }

    #[test]
    fn test_cleared_store_empties_cache() {
        let mut store = NoteStore::new(GridConfig::new(16, 1));
        store.insert(ScheduledNote::new(0, 60, 2, 0.8, 60));

        let mut cache = LoopCache::new();
        cache.rebuild_if_dirty(&mut store);
        assert_eq!(cache.len(), 1);

        store.clear();
        cache.rebuild_if_dirty(&mut store);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_entries_sorted_order() {
        let mut store = NoteStore::new(GridConfig::new(16, 2));
        store.insert(ScheduledNote::new(17, 72, 2, 0.8, 60));
        store.insert(ScheduledNote::new(1, 60, 2, 0.8, 60));
        store.insert(ScheduledNote::new(16, 67, 2, 0.8, 60));

        let mut cache = LoopCache::new();
        cache.rebuild_if_dirty(&mut store);

        let sorted = cache.entries_sorted();
        assert_eq!(
            sorted.iter().map(|e| (e.bin, e.local_step)).collect::<Vec<_>>(),
            vec![(0, 1), (1, 0), (1, 1)]
        );
    }
}
