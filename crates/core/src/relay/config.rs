use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ffmpeg relay launcher.
///
/// The transcoding argument template itself is fixed (see `launcher.rs`);
/// only the binary location, the early-failure grace window and the
/// per-broadcast log directory are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// How long a freshly spawned relay must stay alive before the launch
    /// is considered successful.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
    /// Directory for per-broadcast relay log files.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            grace_period_ms: default_grace_period_ms(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_grace_period_ms() -> u64 {
    1500
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("relay-logs")
}
