// Pulsemaze - Quantized loop sequencer and timing-window collection engine
// Library exports for the game shell, tests, and benchmarks

pub mod bridge;
pub mod harmony;
pub mod messaging;
pub mod sequencer;
pub mod session;
pub mod track;
pub mod world;

// Re-export commonly used types for convenience
pub use bridge::{BridgeConfig, BridgeOrchestrator, BridgePhase, LinearFade, PhasePlan};
pub use harmony::{CandidatePool, ChordShape, PitchRange, ScaleTemplate, WeightedList};
pub use messaging::channels::{create_command_channel, create_notification_channel};
pub use messaging::{EngineCommand, Notification, NotificationCategory, NotificationLevel};
pub use sequencer::{
    ActionJudgment, GridConfig, LoopCache, NoteStore, ScheduledNote, StepScheduler, TimingJudge,
    TransportState, WindowConfig, snap_to_step,
};
pub use session::{PhaseRecord, PhaseTag, SessionHistory};
pub use track::{Track, TrackId, TrackRegistry, TrackRole};
pub use world::{
    ChannelNotePlayer, CollectibleField, CollectibleSource, NotePlayer, TransportSource, WorldSink,
};
