//! Types for the stream orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relay::RelayError;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A handle already exists for this broadcast id.
    #[error("broadcast already running: {broadcast_id}")]
    AlreadyRunning { broadcast_id: String },

    /// The orchestrator has been shut down and refuses new broadcasts.
    #[error("orchestrator is shut down")]
    ShutDown,

    /// The relay process could not be launched.
    #[error("relay launch failed: {0}")]
    Launch(#[from] RelayError),
}

/// Snapshot of one running broadcast.
///
/// This is a copy of the handle's routing metadata; it carries no reference
/// to the live process and cannot be used to mutate orchestrator state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveBroadcast {
    /// Broadcast definition id.
    pub broadcast_id: String,
    /// Nomination the broadcast belongs to.
    pub nomination: String,
    /// Camera source URL.
    pub source_url: String,
    /// Full destination endpoint (platform URL + token).
    pub destination_url: String,
    /// OS process id of the relay, if available.
    pub pid: Option<u32>,
    /// When the relay was started.
    pub started_at: DateTime<Utc>,
}

/// One failed broadcast within a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastFailure {
    pub broadcast_id: String,
    pub reason: String,
}

/// Outcome of a bulk start/stop: which of the requested broadcasts failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Number of broadcasts the operation was asked to process.
    pub requested: usize,
    /// The broadcasts that failed, with reasons.
    pub failures: Vec<BroadcastFailure>,
}

impl BatchOutcome {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, broadcast_id: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(BroadcastFailure {
            broadcast_id: broadcast_id.into(),
            reason: reason.into(),
        });
    }

    /// Every requested broadcast succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Some, but not all, requested broadcasts succeeded.
    pub fn partial(&self) -> bool {
        !self.failures.is_empty() && self.failures.len() < self.requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_flags() {
        let mut outcome = BatchOutcome::new(3);
        assert!(outcome.all_succeeded());
        assert!(!outcome.partial());

        outcome.record_failure("bc-1", "launch failed");
        assert!(!outcome.all_succeeded());
        assert!(outcome.partial());

        outcome.record_failure("bc-2", "launch failed");
        outcome.record_failure("bc-3", "launch failed");
        assert!(!outcome.partial());
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::AlreadyRunning {
            broadcast_id: "bc-7".to_string(),
        };
        assert_eq!(err.to_string(), "broadcast already running: bc-7");

        assert_eq!(
            OrchestratorError::ShutDown.to_string(),
            "orchestrator is shut down"
        );
    }

    #[test]
    fn test_active_broadcast_serialization() {
        let active = ActiveBroadcast {
            broadcast_id: "bc-1".to_string(),
            nomination: "finals".to_string(),
            source_url: "rtsp://cam1".to_string(),
            destination_url: "https://plat.example/abc".to_string(),
            pid: Some(4242),
            started_at: Utc::now(),
        };

        let json = serde_json::to_string(&active).unwrap();
        let parsed: ActiveBroadcast = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.broadcast_id, "bc-1");
        assert_eq!(parsed.pid, Some(4242));
    }
}
