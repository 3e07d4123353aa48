use std::sync::Arc;

use restream_core::{
    Config, DefinitionStore, FfmpegRelay, StreamOrchestrator, StreamService,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn DefinitionStore>,
    orchestrator: Arc<StreamOrchestrator<FfmpegRelay>>,
    service: StreamService<FfmpegRelay>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DefinitionStore>,
        orchestrator: Arc<StreamOrchestrator<FfmpegRelay>>,
        service: StreamService<FfmpegRelay>,
    ) -> Self {
        Self {
            config,
            store,
            orchestrator,
            service,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn DefinitionStore {
        self.store.as_ref()
    }

    pub fn orchestrator(&self) -> &StreamOrchestrator<FfmpegRelay> {
        &self.orchestrator
    }

    pub fn service(&self) -> &StreamService<FfmpegRelay> {
        &self.service
    }
}
