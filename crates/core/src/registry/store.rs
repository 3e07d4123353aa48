//! Definition storage trait and filter types.

use thiserror::Error;

use super::types::{
    BroadcastDefinition, CreateDefinitionRequest, GroupKey, UpdateDefinitionRequest,
};

/// Error type for definition store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Definition not found.
    #[error("Broadcast definition not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Filter for querying broadcast definitions.
#[derive(Debug, Clone)]
pub struct DefinitionFilter {
    /// Filter by nomination.
    pub nomination: Option<String>,
    /// Filter by event day.
    pub day: Option<i64>,
    /// Filter by platform name.
    pub platform: Option<String>,
    /// Filter by active flag.
    pub active: Option<bool>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for DefinitionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            nomination: None,
            day: None,
            platform: None,
            active: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by nomination.
    pub fn with_nomination(mut self, nomination: impl Into<String>) -> Self {
        self.nomination = Some(nomination.into());
        self
    }

    /// Filter by event day.
    pub fn with_day(mut self, day: i64) -> Self {
        self.day = Some(day);
        self
    }

    /// Filter by platform name.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Filter by active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Filter matching one group key.
    pub fn for_group(key: &GroupKey, active_only: bool) -> Self {
        let filter = match key {
            GroupKey::Nomination(name) => Self::new().with_nomination(name.clone()),
            GroupKey::Day(day) => Self::new().with_day(*day),
            GroupKey::Platform(name) => Self::new().with_platform(name.clone()),
            GroupKey::All => Self::new(),
        };
        let filter = filter.with_limit(i64::MAX);
        if active_only {
            filter.with_active(true)
        } else {
            filter
        }
    }
}

/// Trait for broadcast definition storage backends.
pub trait DefinitionStore: Send + Sync {
    /// Create a new definition.
    fn create(&self, request: CreateDefinitionRequest) -> Result<BroadcastDefinition, StoreError>;

    /// Get a definition by id.
    fn get(&self, id: &str) -> Result<Option<BroadcastDefinition>, StoreError>;

    /// List definitions matching the filter.
    fn list(&self, filter: &DefinitionFilter) -> Result<Vec<BroadcastDefinition>, StoreError>;

    /// Count definitions matching the filter.
    fn count(&self, filter: &DefinitionFilter) -> Result<i64, StoreError>;

    /// Resolve a group key to its definitions.
    fn list_for_group(
        &self,
        key: &GroupKey,
        active_only: bool,
    ) -> Result<Vec<BroadcastDefinition>, StoreError> {
        self.list(&DefinitionFilter::for_group(key, active_only))
    }

    /// Update the mutable fields of a definition.
    fn update(
        &self,
        id: &str,
        update: UpdateDefinitionRequest,
    ) -> Result<BroadcastDefinition, StoreError>;

    /// Permanently delete a definition. Returns the deleted definition.
    fn delete(&self, id: &str) -> Result<BroadcastDefinition, StoreError>;
}
