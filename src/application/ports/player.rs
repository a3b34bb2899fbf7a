//! Playback port interface
//!
//! The session core treats the reference track as opaque: the player owns
//! decoding, the core only needs "play this file, notify me on completion".

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Failed to open audio source: {0}")]
    OpenFailed(String),

    #[error("Playback failed to start: {0}")]
    StartFailed(String),

    #[error("No audio output device available")]
    NoOutputDevice,
}

/// Receiver that resolves when playback finishes naturally.
/// Dropped without a value if playback is stopped or the player fails.
pub type PlaybackCompletion = oneshot::Receiver<()>;

/// Port for reference track playback
#[async_trait]
pub trait Player: Send + Sync {
    /// Validate and stage an audio source for playback.
    /// Fails if the file is missing, unreadable, or not decodable.
    async fn open(&self, path: &Path) -> Result<(), PlaybackError>;

    /// Start playing the opened source.
    ///
    /// Returns a completion receiver that fires when the track ends on its
    /// own. Stopping the player drops the sender without firing it.
    async fn play(&self) -> Result<PlaybackCompletion, PlaybackError>;

    /// Stop playback and release the output device.
    /// Best-effort; never fails, safe to call when not playing.
    async fn stop(&self);

    /// Check if playback is in progress
    fn is_playing(&self) -> bool;
}
