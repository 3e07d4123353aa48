//! Stream orchestrator: lifecycle of live relay processes.
//!
//! The orchestrator owns the in-memory registry of running broadcasts, keyed
//! by nomination. All mutation goes through a single lock; operations on the
//! registry are therefore totally ordered. Launching a relay happens while
//! holding the lock; launches are sub-second and broadcast counts are small,
//! so the one-handle-per-broadcast invariant is kept with serialized starts.

mod handle;
mod runner;
mod types;

pub use runner::StreamOrchestrator;
pub use types::{ActiveBroadcast, BatchOutcome, BroadcastFailure, OrchestratorError};
