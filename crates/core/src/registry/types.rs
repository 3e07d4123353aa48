//! Broadcast definition types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One camera-to-platform broadcast, as configured by an administrator.
///
/// Immutable once created except for `active` and `token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastDefinition {
    /// Unique id.
    pub id: String,
    /// Nomination this broadcast belongs to.
    pub nomination: String,
    /// Event day grouping.
    pub day: i64,
    /// Destination platform name (e.g. "youtube").
    pub platform: String,
    /// Platform ingest base URL.
    pub platform_url: String,
    /// Optional stream token appended to the platform URL.
    pub token: Option<String>,
    /// Camera source URL.
    pub source_url: String,
    /// Whether this broadcast takes part in group starts.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new broadcast definition.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDefinitionRequest {
    pub nomination: String,
    pub day: i64,
    pub platform: String,
    pub platform_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub source_url: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Mutable fields of a definition. Anything else requires delete + recreate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDefinitionRequest {
    pub active: Option<bool>,
    pub token: Option<String>,
}

/// Identifies a set of broadcast definitions for bulk operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    /// All broadcasts of one nomination.
    Nomination(String),
    /// All broadcasts of one event day.
    Day(i64),
    /// All broadcasts targeting one platform.
    Platform(String),
    /// Every configured broadcast.
    All,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Nomination(name) => write!(f, "nomination {}", name),
            GroupKey::Day(day) => write!(f, "day {}", day),
            GroupKey::Platform(name) => write!(f, "platform {}", name),
            GroupKey::All => write!(f, "all broadcasts"),
        }
    }
}
