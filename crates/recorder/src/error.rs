//! Recorder error definitions

use chrono::{DateTime, Utc};
use contracts::ContractError;
use thiserror::Error;

/// Session lifecycle errors
///
/// Invalid state transitions are caller errors, never a crash.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `start()` while a session is active
    #[error("a session is already active (started at {started_at})")]
    AlreadyRecording { started_at: DateTime<Utc> },

    /// An operator input arrived with no active session
    #[error("no active session")]
    NotRecording,

    /// The sampling scheduler task died; captured frames were still flushed
    #[error("sampling scheduler fault: {message}")]
    Scheduler { message: String },

    /// Underlying contract error
    #[error(transparent)]
    Contract(#[from] ContractError),
}
