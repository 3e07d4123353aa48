//! Group-level stream operations.

use std::sync::Arc;

use tracing::info;

use crate::orchestrator::{ActiveBroadcast, BatchOutcome, StreamOrchestrator};
use crate::registry::{DefinitionStore, GroupKey};
use crate::relay::Relay;

use super::types::ServiceError;

/// Resolves group keys against the definition store and fans the resulting
/// definitions out to the orchestrator.
pub struct StreamService<R: Relay> {
    store: Arc<dyn DefinitionStore>,
    orchestrator: Arc<StreamOrchestrator<R>>,
}

impl<R: Relay> StreamService<R> {
    pub fn new(store: Arc<dyn DefinitionStore>, orchestrator: Arc<StreamOrchestrator<R>>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// Start every active definition in the group.
    ///
    /// A group that resolves to no active definitions is an error; asking to
    /// start nothing is a caller mistake, not a success. Per-broadcast launch
    /// failures are collected in the outcome and do not abort the batch.
    pub async fn start_group(&self, key: &GroupKey) -> Result<BatchOutcome, ServiceError> {
        let definitions = self.store.list_for_group(key, true)?;
        if definitions.is_empty() {
            return Err(ServiceError::GroupNotFound(key.clone()));
        }

        info!("Starting {} broadcasts for {}", definitions.len(), key);
        Ok(self.orchestrator.start_many(&definitions).await)
    }

    /// Stop every broadcast in the group.
    ///
    /// A group with nothing running is a successful no-op; stop is idempotent
    /// at the group level just as it is per broadcast. Inactive definitions
    /// are resolved too, so a definition deactivated while its broadcast runs
    /// can still be stopped through its group.
    pub async fn stop_group(&self, key: &GroupKey) -> Result<BatchOutcome, ServiceError> {
        if matches!(key, GroupKey::All) {
            let stopped = self.orchestrator.stop_all().await;
            return Ok(BatchOutcome::new(stopped));
        }

        let definitions = self.store.list_for_group(key, false)?;
        let mut outcome = BatchOutcome::new(definitions.len());
        for definition in &definitions {
            if let Err(e) = self.orchestrator.stop(&definition.id).await {
                outcome.record_failure(&definition.id, e.to_string());
            }
        }

        info!(
            "Stopped broadcasts for {} ({} requested, {} failed)",
            key,
            outcome.requested,
            outcome.failures.len()
        );
        Ok(outcome)
    }

    /// Start one broadcast by definition id.
    pub async fn start_broadcast(&self, id: &str) -> Result<ActiveBroadcast, ServiceError> {
        let definition = self
            .store
            .get(id)?
            .ok_or_else(|| ServiceError::DefinitionNotFound(id.to_string()))?;
        Ok(self.orchestrator.start(&definition).await?)
    }

    /// Stop one broadcast by id. Returns whether a broadcast was running.
    pub async fn stop_broadcast(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.orchestrator.stop(id).await?)
    }

    /// Snapshot of all running broadcasts.
    pub async fn list_active(&self) -> Vec<ActiveBroadcast> {
        self.orchestrator.list_active().await
    }
}
