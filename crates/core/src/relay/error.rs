//! Error types for the relay module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while launching or terminating a relay process.
#[derive(Debug, Error)]
pub enum RelayError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// The relay process could not be spawned.
    #[error("Failed to spawn relay for broadcast {broadcast_id}: {reason}")]
    SpawnFailed {
        broadcast_id: String,
        reason: String,
    },

    /// The relay process exited within the grace window after start.
    #[error("Relay for broadcast {broadcast_id} exited immediately ({status}): {stderr_tail}")]
    ExitedEarly {
        broadcast_id: String,
        status: String,
        stderr_tail: String,
    },

    /// I/O error talking to the relay process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Creates a spawn failure error.
    pub fn spawn_failed(broadcast_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            broadcast_id: broadcast_id.into(),
            reason: reason.into(),
        }
    }
}
