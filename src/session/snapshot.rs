// Types for session history persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Musical section a completed phase belonged to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTag {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

/// One note of a persisted phase snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub step: u32,
    pub pitch: u8,
    pub velocity: f32,
    pub color: [f32; 3],
}

/// Record of one completed phase, written once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub id: Uuid,
    pub phase: PhaseTag,
    /// Display color of the phase as a whole
    pub color: [f32; 3],
    pub recorded_at: DateTime<Utc>,
    /// Notes ordered by step
    pub notes: Vec<NoteEntry>,
}

impl PhaseRecord {
    /// Creates a record stamped now
    pub fn new(phase: PhaseTag, color: [f32; 3], mut notes: Vec<NoteEntry>) -> Self {
        notes.sort_by_key(|n| n.step);
        Self {
            id: Uuid::new_v4(),
            phase,
            color,
            recorded_at: Utc::now(),
            notes,
        }
    }
}

/// Append-only history of completed phases
///
/// Records are pushed once per phase transition and never rewritten;
/// readers get shared access only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    records: Vec<PhaseRecord>,
}

impl SessionHistory {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed phase record
    pub fn push(&mut self, record: PhaseRecord) {
        self.records.push(record);
    }

    /// All records in completion order
    pub fn records(&self) -> &[PhaseRecord] {
        &self.records
    }

    /// Number of completed phases
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no phase has completed yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Compact history summary for display surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub record_count: usize,
    pub total_notes: usize,
    pub last_recorded_at: Option<DateTime<Utc>>,
}

impl SessionSummary {
    /// Summarize a history
    pub fn of(history: &SessionHistory) -> Self {
        Self {
            record_count: history.len(),
            total_notes: history.records().iter().map(|r| r.notes.len()).sum(),
            last_recorded_at: history.records().last().map(|r| r.recorded_at),
        }
    }
}
