// World module - Contracts with the external collaborators
// The engine never renders, synthesizes, or builds mazes; it talks to
// these interfaces and stays testable with in-memory fakes

pub mod collectible;

pub use collectible::{CollectEvent, Collectible, CollectibleField, CollectibleId, ObserverId};

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::{EngineCommand, NotePlayParams};
use crate::sequencer::TransportState;
use crate::session::snapshot::NoteEntry;
use crate::track::TrackId;
use ringbuf::traits::Producer;

/// Opaque sound backend: accepts a note and plays it, fire-and-forget
pub trait NotePlayer {
    fn play(&mut self, pitch: u8, duration_ms: u32, velocity: u8, channel: u8);
}

/// External playback position source
pub trait TransportSource {
    /// Position within the current loop iteration, in ticks
    fn position_ticks(&self) -> u64;
    /// Length of one loop iteration, in ticks
    fn loop_length_ticks(&self) -> u64;
    /// Continuous monotonic clock, in seconds, for timing-window judgment
    fn clock_seconds(&self) -> f64;

    /// Snapshot the source for one scheduling poll
    fn snapshot(&self, ms_per_tick: f64) -> TransportState {
        let mut state = TransportState::new(self.loop_length_ticks(), ms_per_tick);
        state.position_ticks = self.position_ticks();
        state
    }
}

/// Rendering/visualization sink driven at phase boundaries
pub trait WorldSink {
    /// Show the completed loop's notes during the cinematic replay
    fn show_replay(&mut self, notes: &[NoteEntry]);
    /// Drop all visualized note state
    fn clear_all(&mut self);
    /// Reconfigure the displayed grid width (steps per bin)
    fn configure_grid(&mut self, steps_per_bin: u32);
    /// Request regeneration of non-audio world state (maze, layout)
    fn request_layout(&mut self);
}

/// Source of in-flight collectible actors
///
/// The bridge asks it to despawn everything when freezing and watches
/// `active_count` to know when the drain completed.
pub trait CollectibleSource {
    /// Request despawn of every live collectible
    fn despawn_all(&mut self);
    /// Collectibles still alive (draining counts as alive)
    fn active_count(&self) -> usize;
    /// Remove one step from a track's eligibility after a credited hit
    fn consume_step(&mut self, track: TrackId, step: u32);
}

/// Note player that forwards triggers over the lock-free command channel
///
/// A full queue drops the note with a warning rather than blocking; the
/// engine side of the channel must never stall on the audio shell.
pub struct ChannelNotePlayer {
    producer: CommandProducer,
}

impl ChannelNotePlayer {
    /// Wrap a command producer
    pub fn new(producer: CommandProducer) -> Self {
        Self { producer }
    }
}

impl NotePlayer for ChannelNotePlayer {
    fn play(&mut self, pitch: u8, duration_ms: u32, velocity: u8, channel: u8) {
        let command = EngineCommand::PlayNote(NotePlayParams {
            pitch,
            duration_ms,
            velocity,
            channel,
        });
        if self.producer.try_push(command).is_err() {
            log::warn!("command queue full, dropping note (pitch {})", pitch);
        }
    }
}
