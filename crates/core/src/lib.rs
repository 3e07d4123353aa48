//! Core library for restreamd: live camera restreaming orchestration.
//!
//! Broadcast definitions (camera source, platform endpoint, grouping
//! metadata) are persisted in the [`registry`]; the [`relay`] module launches
//! and supervises one ffmpeg process per broadcast; the [`orchestrator`] owns
//! the live processes and serializes their lifecycle; the [`service`]
//! resolves group keys (nomination, day, platform, all) and fans bulk
//! operations out to the orchestrator.

pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod registry;
pub mod relay;
pub mod service;
pub mod testing;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use orchestrator::{
    ActiveBroadcast, BatchOutcome, BroadcastFailure, OrchestratorError, StreamOrchestrator,
};
pub use registry::{
    BroadcastDefinition, CreateDefinitionRequest, DefinitionFilter, DefinitionStore, GroupKey,
    SqliteDefinitionStore, StoreError, UpdateDefinitionRequest,
};
pub use relay::{
    BroadcastLogSink, FfmpegRelay, LaunchJob, Relay, RelayConfig, RelayError, RelayProcess,
};
pub use service::{ServiceError, StreamService};
