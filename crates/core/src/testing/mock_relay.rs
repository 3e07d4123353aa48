//! Mock relay launcher for testing orchestration without real processes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::relay::{BroadcastLogSink, LaunchJob, Relay, RelayError, RelayProcess};

/// A relay launcher that spawns no processes. Records every launch job and
/// can be programmed to fail launches or kills for specific broadcast ids.
pub struct MockRelay {
    jobs: Arc<RwLock<Vec<LaunchJob>>>,
    launch_failures: Arc<RwLock<HashMap<String, String>>>,
    kill_failures: Arc<RwLock<HashMap<String, String>>>,
    spawned: Arc<AtomicUsize>,
    killed: Arc<RwLock<Vec<String>>>,
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRelay {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            launch_failures: Arc::new(RwLock::new(HashMap::new())),
            kill_failures: Arc::new(RwLock::new(HashMap::new())),
            spawned: Arc::new(AtomicUsize::new(0)),
            killed: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Make `launch` fail for this broadcast id.
    pub fn fail_launch(&self, broadcast_id: &str, reason: &str) {
        self.launch_failures
            .write()
            .unwrap()
            .insert(broadcast_id.to_string(), reason.to_string());
    }

    /// Make `terminate` fail for the process launched for this broadcast id.
    pub fn fail_kill(&self, broadcast_id: &str, reason: &str) {
        self.kill_failures
            .write()
            .unwrap()
            .insert(broadcast_id.to_string(), reason.to_string());
    }

    /// Every launch job received, in order, including failed ones.
    pub fn jobs(&self) -> Vec<LaunchJob> {
        self.jobs.read().unwrap().clone()
    }

    /// Number of processes actually spawned (failed launches excluded).
    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Broadcast ids whose processes were killed, in kill order. Failed kill
    /// attempts are not recorded.
    pub fn killed(&self) -> Vec<String> {
        self.killed.read().unwrap().clone()
    }
}

#[async_trait]
impl Relay for MockRelay {
    fn name(&self) -> &str {
        "mock"
    }

    async fn launch(
        &self,
        job: &LaunchJob,
        _sink: BroadcastLogSink,
    ) -> Result<Box<dyn RelayProcess>, RelayError> {
        self.jobs.write().unwrap().push(job.clone());

        if let Some(reason) = self.launch_failures.read().unwrap().get(&job.broadcast_id) {
            return Err(RelayError::spawn_failed(&job.broadcast_id, reason.clone()));
        }

        let pid = 1000 + self.spawned.fetch_add(1, Ordering::SeqCst) as u32;
        let kill_failure = self
            .kill_failures
            .read()
            .unwrap()
            .get(&job.broadcast_id)
            .cloned();

        Ok(Box::new(MockRelayProcess {
            broadcast_id: job.broadcast_id.clone(),
            pid,
            kill_failure,
            terminated: AtomicBool::new(false),
            killed: Arc::clone(&self.killed),
        }))
    }

    async fn validate(&self) -> Result<(), RelayError> {
        Ok(())
    }
}

/// Process handle produced by `MockRelay`. Tracks termination in the relay's
/// shared kill log.
pub struct MockRelayProcess {
    broadcast_id: String,
    pid: u32,
    kill_failure: Option<String>,
    terminated: AtomicBool,
    killed: Arc<RwLock<Vec<String>>>,
}

#[async_trait]
impl RelayProcess for MockRelayProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn terminate(&mut self) -> Result<(), RelayError> {
        if let Some(reason) = &self.kill_failure {
            return Err(RelayError::Io(std::io::Error::other(reason.clone())));
        }
        if !self.terminated.swap(true, Ordering::SeqCst) {
            self.killed.write().unwrap().push(self.broadcast_id.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> LaunchJob {
        LaunchJob {
            broadcast_id: id.to_string(),
            source_url: "rtsp://cam1".to_string(),
            platform_url: "https://plat.example".to_string(),
            token: Some("abc".to_string()),
        }
    }

    #[tokio::test]
    async fn test_records_jobs_and_kills() {
        let relay = MockRelay::new();
        let mut process = relay
            .launch(&job("bc-1"), BroadcastLogSink::disabled())
            .await
            .unwrap();

        assert_eq!(relay.spawned(), 1);
        assert_eq!(relay.jobs().len(), 1);

        process.terminate().await.unwrap();
        process.terminate().await.unwrap();
        assert_eq!(relay.killed(), vec!["bc-1".to_string()]);
    }

    #[tokio::test]
    async fn test_programmed_launch_failure() {
        let relay = MockRelay::new();
        relay.fail_launch("bc-1", "no camera");

        let err = relay
            .launch(&job("bc-1"), BroadcastLogSink::disabled())
            .await
            .err()
            .expect("launch should fail");
        assert!(err.to_string().contains("no camera"));
        assert_eq!(relay.spawned(), 0);
        assert_eq!(relay.jobs().len(), 1);
    }
}
