//! Error type for the stream service.

use thiserror::Error;

use crate::orchestrator::OrchestratorError;
use crate::registry::{GroupKey, StoreError};

/// Errors that can occur during group-level stream operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The group key resolved to no broadcast definitions.
    #[error("no broadcast definitions for {0}")]
    GroupNotFound(GroupKey),

    /// No broadcast definition exists with this id.
    #[error("broadcast definition not found: {0}")]
    DefinitionNotFound(String),

    /// Definition store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Orchestrator error on a single-broadcast operation.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_not_found_display() {
        let err = ServiceError::GroupNotFound(GroupKey::Nomination("sprint".to_string()));
        assert_eq!(
            err.to_string(),
            "no broadcast definitions for nomination sprint"
        );

        let err = ServiceError::GroupNotFound(GroupKey::Day(3));
        assert_eq!(err.to_string(), "no broadcast definitions for day 3");
    }
}
