// Track registry - Explicit owner of all tracks
// Passed by reference wherever cross-track queries are needed, never global

use crate::track::{Track, TrackId, TrackRole};

/// Owner of every track in the ensemble
///
/// Components that need cross-track queries receive the registry by
/// reference; there is no ambient singleton to reach for, which keeps the
/// core testable in isolation.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
}

impl TrackRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track, keeping id order for deterministic iteration
    ///
    /// A duplicate id replaces the earlier track with a warning.
    pub fn add(&mut self, track: Track) {
        if let Some(existing) = self.tracks.iter_mut().find(|t| t.id == track.id) {
            log::warn!("replacing track with duplicate id {}", track.id);
            *existing = track;
            return;
        }
        self.tracks.push(track);
        self.tracks.sort_by_key(|t| t.id);
    }

    /// Track by id
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Mutable track by id
    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Lowest-id track of a role
    pub fn find_by_role(&self, role: TrackRole) -> Option<&Track> {
        self.tracks.iter().find(|t| t.role == role)
    }

    /// Mutable lowest-id track of a role
    pub fn find_by_role_mut(&mut self, role: TrackRole) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.role == role)
    }

    /// Iterate tracks in id order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Iterate tracks mutably in id order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.tracks.iter_mut()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the registry holds no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Largest loop multiplier across all tracks
    /// This is the authoritative bin count for whole-ensemble timing
    pub fn max_bin_count(&self) -> u32 {
        self.tracks
            .iter()
            .map(|t| t.grid().bin_count)
            .max()
            .unwrap_or(1)
    }
}
