//! Error types for document mutation and command execution.

use fc_common::{ClipId, EffectId, RecordingId, TrackId};
use thiserror::Error;

/// Typed failure returned by commands and document store mutations.
///
/// A failed command never leaves the document partially modified, and a
/// failure never unwinds across the history: the stack stays consistent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("No project loaded")]
    NoProject,

    #[error("{command} cannot execute: {reason}")]
    PreconditionFailed { command: String, reason: String },

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Effect not found: {0}")]
    EffectNotFound(EffectId),

    #[error("Recording not found: {0}")]
    RecordingNotFound(RecordingId),

    #[error("Id already in use: {0}")]
    DuplicateId(String),

    #[error("Invalid timing: {reason}")]
    InvalidTiming { reason: String },

    #[error("Unsupported frame rate: {0} fps (expected 30 or 60)")]
    UnsupportedFrameRate(u32),

    #[error("Undo snapshot missing for {command}")]
    MissingSnapshot { command: String },
}

/// Convenience Result type for command operations.
pub type CommandResult<T = ()> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = CommandError::PreconditionFailed {
            command: "Move clip".into(),
            reason: "no project loaded".into(),
        };
        assert_eq!(err.to_string(), "Move clip cannot execute: no project loaded");

        let err = CommandError::ClipNotFound(ClipId::new("c42"));
        assert!(err.to_string().contains("c42"));

        let err = CommandError::UnsupportedFrameRate(24);
        assert!(err.to_string().contains("24 fps"));

        let err = CommandError::MissingSnapshot {
            command: "Remove effect".into(),
        };
        assert!(err.to_string().contains("Remove effect"));
    }
}
