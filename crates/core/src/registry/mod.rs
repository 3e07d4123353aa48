//! Persisted broadcast definitions.
//!
//! A definition is the administrator-facing record of one camera-to-platform
//! broadcast. The orchestrator only ever reads point-in-time snapshots of
//! these; live process state is kept in memory by the orchestrator itself.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteDefinitionStore;
pub use store::{DefinitionFilter, DefinitionStore, StoreError};
pub use types::{
    BroadcastDefinition, CreateDefinitionRequest, GroupKey, UpdateDefinitionRequest,
};
