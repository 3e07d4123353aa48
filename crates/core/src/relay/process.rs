//! Owned handle to a running relay process.

use async_trait::async_trait;
use futures::future::join_all;
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::debug;

use super::error::RelayError;

/// A running relay process.
///
/// The owner must call `terminate` exactly once to release the process; the
/// external tool has no clean-shutdown protocol, so termination is a kill,
/// never a negotiation. `terminate` must handle a child that already exited
/// on its own.
#[async_trait]
pub trait RelayProcess: Send {
    /// OS process id, if the process is (or was) running.
    fn pid(&self) -> Option<u32>;

    /// Kill the process and reap it. Safe to call when the process has
    /// already exited.
    async fn terminate(&mut self) -> Result<(), RelayError>;
}

/// Relay process backed by a spawned ffmpeg child.
pub struct FfmpegProcess {
    child: Child,
    forwarders: Vec<JoinHandle<()>>,
}

impl FfmpegProcess {
    pub(super) fn new(child: Child, forwarders: Vec<JoinHandle<()>>) -> Self {
        Self { child, forwarders }
    }
}

#[async_trait]
impl RelayProcess for FfmpegProcess {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self) -> Result<(), RelayError> {
        let result = match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Relay process already exited with {}", status);
                Ok(())
            }
            _ => self.child.kill().await.map_err(RelayError::Io),
        };

        // The pipes close once the process is dead, so the forwarders finish
        // on their own; wait for them to drain the last output lines.
        join_all(std::mem::take(&mut self.forwarders)).await;

        result
    }
}
