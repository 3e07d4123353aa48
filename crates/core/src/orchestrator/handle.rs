//! In-memory record of one running broadcast.

use chrono::{DateTime, Utc};

use super::types::ActiveBroadcast;
use crate::relay::{BroadcastLogSink, RelayError, RelayProcess};

/// One running broadcast: the relay process plus its routing metadata and
/// diagnostic sink. Exactly one handle may exist per broadcast id.
///
/// The handle exclusively owns the process and the sink; both are released
/// exactly once, through `release`.
pub(crate) struct BroadcastHandle {
    pub broadcast_id: String,
    pub nomination: String,
    pub source_url: String,
    pub destination_url: String,
    pub started_at: DateTime<Utc>,
    process: Box<dyn RelayProcess>,
    sink: BroadcastLogSink,
}

impl BroadcastHandle {
    pub(crate) fn new(
        broadcast_id: String,
        nomination: String,
        source_url: String,
        destination_url: String,
        process: Box<dyn RelayProcess>,
        sink: BroadcastLogSink,
    ) -> Self {
        Self {
            broadcast_id,
            nomination,
            source_url,
            destination_url,
            started_at: Utc::now(),
            process,
            sink,
        }
    }

    /// Kill the relay process and close the log sink. The sink is closed
    /// even when the kill fails; after this call the handle is consumed and
    /// nothing is retained.
    pub(crate) async fn release(mut self) -> Result<(), RelayError> {
        let result = self.process.terminate().await;
        self.sink.close().await;
        result
    }

    pub(crate) fn snapshot(&self) -> ActiveBroadcast {
        ActiveBroadcast {
            broadcast_id: self.broadcast_id.clone(),
            nomination: self.nomination.clone(),
            source_url: self.source_url.clone(),
            destination_url: self.destination_url.clone(),
            pid: self.process.pid(),
            started_at: self.started_at,
        }
    }
}
