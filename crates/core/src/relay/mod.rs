//! Relay process management.
//!
//! A relay is one external ffmpeg process pushing a single camera feed to a
//! single platform ingest endpoint. This module owns building the ffmpeg
//! invocation, spawning the child with captured stdio, detecting immediate
//! failure, and terminating the process on stop.

mod config;
mod error;
mod launcher;
mod log_sink;
mod process;

pub use config::RelayConfig;
pub use error::RelayError;
pub use launcher::{FfmpegRelay, LaunchJob, Relay};
pub use log_sink::BroadcastLogSink;
pub use process::{FfmpegProcess, RelayProcess};
