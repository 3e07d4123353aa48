//! FFmpeg-based relay launcher.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

use super::config::RelayConfig;
use super::error::RelayError;
use super::log_sink::BroadcastLogSink;
use super::process::{FfmpegProcess, RelayProcess};

// Fixed invocation constants. These are a wire-level contract with the
// downstream ingest tooling and must not drift.
const RTBUFSIZE: &str = "150M";
const PROBESIZE: &str = "10M";
const ANALYZEDURATION: &str = "10M";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "128k";

/// Number of trailing stderr lines kept for launch-failure diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// One relay launch request: a (camera, platform, token) triple.
#[derive(Debug, Clone)]
pub struct LaunchJob {
    /// Id of the broadcast definition this relay serves.
    pub broadcast_id: String,
    /// Camera source URL (typically rtsp://).
    pub source_url: String,
    /// Platform ingest base URL (rtmp:// or https:// FLV endpoint).
    pub platform_url: String,
    /// Optional stream token appended to the platform URL.
    pub token: Option<String>,
}

impl LaunchJob {
    /// Full destination endpoint: platform URL joined to the token with
    /// exactly one path separator, regardless of trailing/leading slashes.
    pub fn endpoint(&self) -> String {
        match self.token.as_deref() {
            Some(token) if !token.is_empty() => format!(
                "{}/{}",
                self.platform_url.trim_end_matches('/'),
                token.trim_start_matches('/')
            ),
            _ => self.platform_url.clone(),
        }
    }
}

/// A launcher that can start relay processes.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Returns the name of this relay implementation.
    fn name(&self) -> &str;

    /// Launch one relay for the given job, forwarding all process output to
    /// the sink. Returns an error if the process cannot start or dies within
    /// the grace window; on error no live process is left behind.
    async fn launch(
        &self,
        job: &LaunchJob,
        sink: BroadcastLogSink,
    ) -> Result<Box<dyn RelayProcess>, RelayError>;

    /// Validates that the launcher is properly configured and ready.
    async fn validate(&self) -> Result<(), RelayError>;
}

/// FFmpeg-based relay launcher implementation.
pub struct FfmpegRelay {
    config: RelayConfig,
}

impl FfmpegRelay {
    /// Creates a new FFmpeg relay launcher with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Creates a launcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RelayConfig::default())
    }

    /// Builds the fixed ffmpeg argument template for one relay.
    ///
    /// Data and subtitle streams are disabled, the source is forced onto TCP
    /// transport, video is copied untouched, audio is re-encoded to a fixed
    /// AAC bitrate, and the output is muxed as FLV to the token endpoint.
    /// The process ends when the shorter of the two streams ends.
    fn build_args(job: &LaunchJob) -> Vec<String> {
        vec![
            "-nostats".to_string(),
            "-dn".to_string(),
            "-sn".to_string(),
            "-rtsp_transport".to_string(),
            "tcp".to_string(),
            "-rtbufsize".to_string(),
            RTBUFSIZE.to_string(),
            "-probesize".to_string(),
            PROBESIZE.to_string(),
            "-analyzeduration".to_string(),
            ANALYZEDURATION.to_string(),
            "-i".to_string(),
            job.source_url.clone(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            AUDIO_BITRATE.to_string(),
            "-shortest".to_string(),
            "-f".to_string(),
            "flv".to_string(),
            job.endpoint(),
        ]
    }

    /// Forward lines from a process pipe to the broadcast sink, optionally
    /// retaining a tail buffer for diagnostics.
    fn spawn_forwarder<R>(
        reader: R,
        sink: BroadcastLogSink,
        tail: Option<Arc<Mutex<VecDeque<String>>>>,
    ) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(ref tail) = tail {
                    if let Ok(mut buf) = tail.lock() {
                        if buf.len() == STDERR_TAIL_LINES {
                            buf.pop_front();
                        }
                        buf.push_back(line.clone());
                    }
                }
                sink.write_line(&line).await;
            }
        })
    }

    fn format_tail(tail: &Arc<Mutex<VecDeque<String>>>) -> String {
        tail.lock()
            .map(|buf| buf.iter().cloned().collect::<Vec<_>>().join(" | "))
            .unwrap_or_default()
    }
}

#[async_trait]
impl Relay for FfmpegRelay {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn launch(
        &self,
        job: &LaunchJob,
        sink: BroadcastLogSink,
    ) -> Result<Box<dyn RelayProcess>, RelayError> {
        let args = Self::build_args(job);
        debug!(
            "Launching relay for broadcast {}: {} {}",
            job.broadcast_id,
            self.config.ffmpeg_path.display(),
            args.join(" ")
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RelayError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    RelayError::spawn_failed(&job.broadcast_id, e.to_string())
                }
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));

        let mut forwarders = Vec::new();
        if let Some(stdout) = stdout {
            forwarders.push(Self::spawn_forwarder(stdout, sink.clone(), None));
        }
        if let Some(stderr) = stderr {
            forwarders.push(Self::spawn_forwarder(
                stderr,
                sink.clone(),
                Some(Arc::clone(&stderr_tail)),
            ));
        }

        // Grace window: a relay that dies right after spawn is a failed
        // launch, not a running broadcast.
        let grace = Duration::from_millis(self.config.grace_period_ms);
        tokio::select! {
            status = child.wait() => {
                // Already reaped by wait(); drain the forwarders so the tail
                // buffer holds the final stderr lines.
                futures::future::join_all(forwarders).await;
                let status = status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|e| format!("wait failed: {}", e));
                return Err(RelayError::ExitedEarly {
                    broadcast_id: job.broadcast_id.clone(),
                    status,
                    stderr_tail: Self::format_tail(&stderr_tail),
                });
            }
            _ = sleep(grace) => {}
        }

        Ok(Box::new(FfmpegProcess::new(child, forwarders)))
    }

    async fn validate(&self) -> Result<(), RelayError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(RelayError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(RelayError::Io(e));
        }

        tokio::fs::create_dir_all(&self.config.log_dir).await?;

        Ok(())
    }
}
