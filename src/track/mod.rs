// Track module - Per-track sequencing state and the cross-track registry

pub mod registry;

pub use registry::TrackRegistry;

use crate::harmony::{CandidatePool, PitchRange};
use crate::sequencer::{
    GridConfig, LoopCache, NoteStore, ScheduledNote, StepScheduler, TransportState,
};
use crate::world::NotePlayer;

/// Unique identifier for tracks
pub type TrackId = u32;

/// Musical role a track plays in the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TrackRole {
    Lead,
    Bass,
    Chord,
    Percussion,
}

impl TrackRole {
    /// Default pitch range for pools built for this role
    pub fn default_range(&self) -> PitchRange {
        match self {
            TrackRole::Lead => PitchRange::new(60, 84),
            TrackRole::Bass => PitchRange::new(36, 55),
            TrackRole::Chord => PitchRange::new(48, 72),
            TrackRole::Percussion => PitchRange::new(35, 50),
        }
    }
}

/// One sequenced voice: its notes, playback cursor, and output routing
///
/// The track owns its note store exclusively. During normal play only two
/// things touch it: a credited player action inserts one note, and the
/// phase bridge bulk-clears it while the scheduler is frozen.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub role: TrackRole,
    /// Output channel handed to the note player on every fire
    pub channel: u8,
    /// Display color carried into snapshots
    pub color: [f32; 3],
    /// Current output gain (0.0 to 1.0), driven by the bridge during fades
    pub volume: f32,
    /// Gain restored when a fade-in completes
    pub target_volume: f32,

    store: NoteStore,
    cache: LoopCache,
    pub scheduler: StepScheduler,
    pool: CandidatePool,
}

impl Track {
    /// Creates a track with an empty store
    pub fn new(
        id: TrackId,
        role: TrackRole,
        channel: u8,
        color: [f32; 3],
        grid: GridConfig,
        pool: CandidatePool,
    ) -> Self {
        Self {
            id,
            role,
            channel,
            color,
            volume: 1.0,
            target_volume: 1.0,
            store: NoteStore::new(grid),
            cache: LoopCache::new(),
            scheduler: StepScheduler::new(),
            pool,
        }
    }

    /// Grid currently governing this track
    pub fn grid(&self) -> GridConfig {
        self.store.grid()
    }

    /// Grow or reset the loop multiplier
    pub fn set_bin_count(&mut self, bin_count: u32) {
        let grid = self.store.grid().with_bin_count(bin_count);
        self.store.set_grid(grid);
    }

    /// Authoritative note record
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Mutable store access for bulk mutation at phase boundaries
    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    /// Playback cache, rebuilt lazily on poll
    pub fn cache(&self) -> &LoopCache {
        &self.cache
    }

    /// Candidate pool supplying pitches and durations this phase
    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    /// Replace the pool wholesale at a phase boundary
    pub fn set_pool(&mut self, pool: CandidatePool) {
        self.pool = pool;
    }

    /// Rebuild the playback cache if the store changed
    pub fn rebuild_cache_if_dirty(&mut self) -> bool {
        self.cache.rebuild_if_dirty(&mut self.store)
    }

    /// Run one scheduling poll against the transport
    pub fn poll_playback(
        &mut self,
        transport: &TransportState,
        current_bin: u32,
        remaining_phase_ms: Option<f64>,
        player: &mut dyn NotePlayer,
    ) -> u32 {
        self.rebuild_cache_if_dirty();
        let grid = self.store.grid();
        self.scheduler.poll(
            transport,
            grid,
            current_bin,
            &self.cache,
            self.channel,
            remaining_phase_ms,
            player,
        )
    }

    /// Record a credited hit: store the note and sound it immediately
    ///
    /// Returns whether the note was stored (an out-of-range step is
    /// rejected by the store; the immediate trigger is skipped too).
    pub fn collect(
        &mut self,
        note: ScheduledNote,
        transport: &TransportState,
        player: &mut dyn NotePlayer,
    ) -> bool {
        if !self.store.insert(note) {
            return false;
        }
        let duration_ms = transport.ticks_to_ms(note.duration_ticks).floor() as u32;
        if duration_ms > 0 {
            player.play(note.pitch, duration_ms, note.midi_velocity(), self.channel);
        }
        true
    }
}
