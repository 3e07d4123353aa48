//! Per-broadcast diagnostic log sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// One independent log destination per broadcast.
///
/// Every line of relay output is appended to a file under the configured log
/// directory. Writes are best-effort: a sink that failed to open, or a write
/// that fails mid-stream, must never take down the relay that is feeding it.
/// Cloning the sink shares the underlying file; `close` affects all clones.
#[derive(Debug, Clone)]
pub struct BroadcastLogSink {
    path: PathBuf,
    file: Arc<Mutex<Option<File>>>,
}

impl BroadcastLogSink {
    /// Open (append mode) the log file for a broadcast, creating the log
    /// directory if needed. Failure to open degrades to a no-op sink.
    pub async fn create(log_dir: &Path, broadcast_id: &str) -> Self {
        let path = log_dir.join(format!("{}.log", broadcast_id));

        let file = match tokio::fs::create_dir_all(log_dir).await {
            Ok(()) => match OpenOptions::new().create(true).append(true).open(&path).await {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("Failed to open relay log {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!(
                    "Failed to create relay log directory {}: {}",
                    log_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            path,
            file: Arc::new(Mutex::new(file)),
        }
    }

    /// A sink that discards everything (useful for tests).
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            file: Arc::new(Mutex::new(None)),
        }
    }

    /// Append one line. Best-effort; a failed write disables the sink.
    pub async fn write_line(&self, line: &str) {
        let mut guard = self.file.lock().await;
        if let Some(file) = guard.as_mut() {
            let mut buf = Vec::with_capacity(line.len() + 1);
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
            if let Err(e) = file.write_all(&buf).await {
                warn!("Relay log write failed for {}: {}", self.path.display(), e);
                *guard = None;
            }
        }
    }

    /// Flush and release the underlying file.
    pub async fn close(&self) {
        let mut guard = self.file.lock().await;
        if let Some(mut file) = guard.take() {
            let _ = file.flush().await;
        }
    }

    /// Path of the log file (empty for a disabled sink).
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_close() {
        let dir = TempDir::new().unwrap();
        let sink = BroadcastLogSink::create(dir.path(), "bc-1").await;

        sink.write_line("line one").await;
        sink.write_line("line two").await;
        sink.close().await;

        let content = std::fs::read_to_string(dir.path().join("bc-1.log")).unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[tokio::test]
    async fn test_write_after_close_is_noop() {
        let dir = TempDir::new().unwrap();
        let sink = BroadcastLogSink::create(dir.path(), "bc-2").await;
        sink.close().await;
        sink.write_line("ignored").await;

        let content = std::fs::read_to_string(dir.path().join("bc-2.log")).unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_sink_never_fails() {
        let sink = BroadcastLogSink::disabled();
        sink.write_line("nothing happens").await;
        sink.close().await;
    }

    #[tokio::test]
    async fn test_clones_share_file() {
        let dir = TempDir::new().unwrap();
        let sink = BroadcastLogSink::create(dir.path(), "bc-3").await;
        let clone = sink.clone();

        clone.write_line("from clone").await;
        sink.close().await;
        clone.write_line("after close").await;

        let content = std::fs::read_to_string(dir.path().join("bc-3.log")).unwrap();
        assert_eq!(content, "from clone\n");
    }
}
