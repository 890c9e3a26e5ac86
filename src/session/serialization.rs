// Serialization utilities for session history persistence

use crate::session::snapshot::{SessionHistory, SessionSummary};
use ron::{from_str as ron_from_str, to_string as ron_to_string};
use std::fs;
use std::path::Path;

/// Session persistence error types
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a session history to RON format
pub fn serialize_to_ron(history: &SessionHistory) -> Result<String, SessionError> {
    ron_to_string(history).map_err(|e| {
        SessionError::SerializationError(format!("Failed to serialize to RON: {}", e))
    })
}

/// Deserialize a session history from RON format
pub fn deserialize_from_ron(ron_data: &str) -> Result<SessionHistory, SessionError> {
    ron_from_str(ron_data).map_err(|e| {
        SessionError::SerializationError(format!("Failed to deserialize from RON: {}", e))
    })
}

/// Serialize a history summary to JSON format
pub fn serialize_summary_to_json(summary: &SessionSummary) -> Result<String, SessionError> {
    serde_json::to_string_pretty(summary).map_err(|e| {
        SessionError::SerializationError(format!("Failed to serialize summary to JSON: {}", e))
    })
}

/// Deserialize a history summary from JSON format
pub fn deserialize_summary_from_json(json_data: &str) -> Result<SessionSummary, SessionError> {
    serde_json::from_str(json_data).map_err(|e| {
        SessionError::SerializationError(format!("Failed to deserialize summary from JSON: {}", e))
    })
}

/// Write a session history to disk as RON
pub fn save_history(path: &Path, history: &SessionHistory) -> Result<(), SessionError> {
    let ron_data = serialize_to_ron(history)?;
    fs::write(path, ron_data)?;
    Ok(())
}

/// Load a session history from disk
pub fn load_history(path: &Path) -> Result<SessionHistory, SessionError> {
    let ron_data = fs::read_to_string(path)?;
    deserialize_from_ron(&ron_data)
}
