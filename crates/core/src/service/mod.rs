//! Stream service: group-level operations on top of the orchestrator.
//!
//! The service resolves a group key to broadcast definitions through the
//! definition store and fans the result out to the orchestrator. It is the
//! only place grouping policy lives; the orchestrator never touches the
//! store.

mod stream_service;
mod types;

pub use stream_service::StreamService;
pub use types::ServiceError;
