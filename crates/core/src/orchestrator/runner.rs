//! Stream orchestrator implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::registry::BroadcastDefinition;
use crate::relay::{BroadcastLogSink, LaunchJob, Relay};

use super::handle::BroadcastHandle;
use super::types::{ActiveBroadcast, BatchOutcome, OrchestratorError};

/// The stream orchestrator: owns every live relay process.
///
/// The registry maps a nomination to the handles currently running for it.
/// One lock serializes every operation; start/stop sequences against the
/// same broadcast id are therefore totally ordered, and the duplicate check
/// in `start` is race-free.
pub struct StreamOrchestrator<R: Relay> {
    relay: Arc<R>,
    log_dir: PathBuf,
    registry: Mutex<HashMap<String, Vec<BroadcastHandle>>>,
    shut_down: AtomicBool,
}

impl<R: Relay> StreamOrchestrator<R> {
    /// Create a new orchestrator. `log_dir` is where per-broadcast relay
    /// logs are written.
    pub fn new(relay: Arc<R>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            relay,
            log_dir: log_dir.into(),
            registry: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start one broadcast from a definition snapshot.
    ///
    /// A broadcast id with an existing handle is rejected with
    /// `AlreadyRunning`; a second relay is never spawned for the same id.
    /// On launch failure the registry is left untouched.
    pub async fn start(
        &self,
        definition: &BroadcastDefinition,
    ) -> Result<ActiveBroadcast, OrchestratorError> {
        let mut registry = self.registry.lock().await;

        if self.shut_down.load(Ordering::SeqCst) {
            return Err(OrchestratorError::ShutDown);
        }

        let duplicate = registry
            .values()
            .flatten()
            .any(|h| h.broadcast_id == definition.id);
        if duplicate {
            return Err(OrchestratorError::AlreadyRunning {
                broadcast_id: definition.id.clone(),
            });
        }

        let job = LaunchJob {
            broadcast_id: definition.id.clone(),
            source_url: definition.source_url.clone(),
            platform_url: definition.platform_url.clone(),
            token: definition.token.clone(),
        };
        let destination_url = job.endpoint();

        let sink = BroadcastLogSink::create(&self.log_dir, &definition.id).await;

        match self.relay.launch(&job, sink.clone()).await {
            Ok(process) => {
                let handle = BroadcastHandle::new(
                    definition.id.clone(),
                    definition.nomination.clone(),
                    definition.source_url.clone(),
                    destination_url,
                    process,
                    sink,
                );
                let snapshot = handle.snapshot();

                registry
                    .entry(definition.nomination.clone())
                    .or_default()
                    .push(handle);

                metrics::BROADCASTS_STARTED.inc();
                Self::update_active_gauge(&registry);

                info!(
                    "Started broadcast {} ({} -> {})",
                    snapshot.broadcast_id, snapshot.source_url, snapshot.destination_url
                );
                Ok(snapshot)
            }
            Err(e) => {
                sink.close().await;
                metrics::BROADCAST_START_FAILURES.inc();
                warn!("Failed to start broadcast {}: {}", definition.id, e);
                Err(e.into())
            }
        }
    }

    /// Stop one broadcast by id.
    ///
    /// Stopping an unknown or already-stopped id is a no-op returning
    /// `Ok(false)`. The registry entry is removed even when the kill fails.
    pub async fn stop(&self, broadcast_id: &str) -> Result<bool, OrchestratorError> {
        let mut registry = self.registry.lock().await;

        let group_key = registry.iter().find_map(|(key, handles)| {
            handles
                .iter()
                .any(|h| h.broadcast_id == broadcast_id)
                .then(|| key.clone())
        });

        let Some(key) = group_key else {
            debug!("Stop for unknown broadcast {} is a no-op", broadcast_id);
            return Ok(false);
        };

        let handles = registry.get_mut(&key).expect("group key just observed");
        let idx = handles
            .iter()
            .position(|h| h.broadcast_id == broadcast_id)
            .expect("handle just observed");
        let handle = handles.remove(idx);
        if handles.is_empty() {
            registry.remove(&key);
        }

        metrics::BROADCASTS_STOPPED.inc();
        Self::update_active_gauge(&registry);

        match handle.release().await {
            Ok(()) => {
                info!("Stopped broadcast {}", broadcast_id);
                Ok(true)
            }
            Err(e) => {
                metrics::BROADCAST_STOP_FAILURES.inc();
                warn!("Failed to stop broadcast {} cleanly: {}", broadcast_id, e);
                Err(e.into())
            }
        }
    }

    /// Start a batch of broadcasts sequentially. A failure on one definition
    /// is recorded and does not abort the rest of the batch.
    pub async fn start_many(&self, definitions: &[BroadcastDefinition]) -> BatchOutcome {
        let mut outcome = BatchOutcome::new(definitions.len());
        for definition in definitions {
            if let Err(e) = self.start(definition).await {
                outcome.record_failure(&definition.id, e.to_string());
            }
        }
        outcome
    }

    /// Stop every running broadcast, best-effort. A failure stopping one
    /// handle never prevents the remaining handles from being stopped; the
    /// registry is empty afterwards regardless. Returns how many broadcasts
    /// were stopped.
    pub async fn stop_all(&self) -> usize {
        let mut registry = self.registry.lock().await;

        let mut stopped = 0;
        for (_, handles) in registry.drain() {
            for handle in handles {
                let broadcast_id = handle.broadcast_id.clone();
                stopped += 1;
                metrics::BROADCASTS_STOPPED.inc();
                if let Err(e) = handle.release().await {
                    metrics::BROADCAST_STOP_FAILURES.inc();
                    warn!("Failed to stop broadcast {} cleanly: {}", broadcast_id, e);
                }
            }
        }

        Self::update_active_gauge(&registry);
        if stopped > 0 {
            info!("Stopped {} broadcasts", stopped);
        }
        stopped
    }

    /// Snapshot of all running broadcasts. The returned values carry no
    /// reference to orchestrator state.
    pub async fn list_active(&self) -> Vec<ActiveBroadcast> {
        let registry = self.registry.lock().await;
        let mut active: Vec<ActiveBroadcast> = registry
            .values()
            .flatten()
            .map(BroadcastHandle::snapshot)
            .collect();
        active.sort_by(|a, b| a.broadcast_id.cmp(&b.broadcast_id));
        active
    }

    /// Number of running broadcasts.
    pub async fn active_count(&self) -> usize {
        self.registry.lock().await.values().map(Vec::len).sum()
    }

    /// Whether `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Stop everything and permanently refuse new broadcasts. Idempotent;
    /// errors are logged, never propagated, so application termination can
    /// always proceed.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Orchestrator already shut down");
            return;
        }

        info!("Shutting down stream orchestrator");
        let stopped = self.stop_all().await;
        info!("Stream orchestrator shut down ({} broadcasts stopped)", stopped);
    }

    fn update_active_gauge(registry: &HashMap<String, Vec<BroadcastHandle>>) {
        let total: usize = registry.values().map(Vec::len).sum();
        metrics::ACTIVE_BROADCASTS.set(total as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRelay;

    fn definition(id: &str, nomination: &str) -> BroadcastDefinition {
        use chrono::Utc;
        BroadcastDefinition {
            id: id.to_string(),
            nomination: nomination.to_string(),
            day: 1,
            platform: "youtube".to_string(),
            platform_url: "https://plat.example/".to_string(),
            token: Some("abc".to_string()),
            source_url: "rtsp://cam1".to_string(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_start_records_destination_endpoint() {
        let relay = Arc::new(MockRelay::new());
        let orchestrator = StreamOrchestrator::new(relay, std::env::temp_dir());

        let active = orchestrator.start(&definition("bc-1", "finals")).await.unwrap();
        assert_eq!(active.destination_url, "https://plat.example/abc");
        assert_eq!(orchestrator.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_group_entry_removed_when_empty() {
        let relay = Arc::new(MockRelay::new());
        let orchestrator = StreamOrchestrator::new(relay, std::env::temp_dir());

        orchestrator.start(&definition("bc-1", "finals")).await.unwrap();
        orchestrator.stop("bc-1").await.unwrap();

        let registry = orchestrator.registry.lock().await;
        assert!(registry.is_empty());
    }
}
