// Harmony module - Scale templates, chord shapes, and candidate pools

pub mod pool;
pub mod scale;

pub use pool::{CandidatePool, DEFAULT_DURATION_TICKS, WeightedList};
pub use scale::{ChordShape, PitchRange, ScaleTemplate};
