//! Microphone capture port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Capture errors.
///
/// These never surface to the session caller: a microphone that cannot be
/// opened is a degraded mode (playback proceeds with nothing recorded), so
/// adapters log these instead of returning them from `begin`.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Unsupported capture format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to start capture: {0}")]
    StartFailed(String),
}

/// Port for streaming microphone capture to a WAV file
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// Begin capturing to the given file. No-op if already recording.
    ///
    /// Device initialization happens on the capture thread; the caller does
    /// not block on it. If the microphone cannot be opened the engine ends
    /// up not recording and no file is created or truncated.
    async fn begin(&self, path: &Path);

    /// Stop capturing, release the microphone, and schedule the WAV header
    /// patch on an independent thread. Idempotent; no-op if not recording.
    async fn end(&self);

    /// Check if the capture loop is running
    fn is_recording(&self) -> bool;
}
