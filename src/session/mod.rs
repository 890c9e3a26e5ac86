// Session module - Persisted history of completed phases

pub mod serialization;
pub mod snapshot;

pub use serialization::{SessionError, load_history, save_history};
pub use snapshot::{NoteEntry, PhaseRecord, PhaseTag, SessionHistory, SessionSummary};
