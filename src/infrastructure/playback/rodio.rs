//! Rodio-based playback adapter
//!
//! Plays the reference track on a dedicated thread: `rodio::OutputStream` is
//! not `Send`, so the thread owns it for the whole playback and drops it when
//! the sink drains. The `Sink` is shared behind an `Arc` so `stop()` can cut
//! playback short from any thread. Natural completion is reported over a
//! oneshot channel; a cancelled playback drops the sender silently.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex as StdMutex};

use async_trait::async_trait;
use log::{debug, warn};
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;

use crate::application::ports::{PlaybackCompletion, PlaybackError, Player};

/// Reference track player using rodio
pub struct RodioPlayer {
    source: StdMutex<Option<PathBuf>>,
    sink: StdMutex<Option<Arc<Sink>>>,
    cancelled: Arc<AtomicBool>,
}

impl RodioPlayer {
    /// Create a new rodio-based player
    pub fn new() -> Self {
        Self {
            source: StdMutex::new(None),
            sink: StdMutex::new(None),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Open and probe the source file. Decoding stays the player's concern; the
/// session core never looks inside the file.
fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path)
        .map_err(|e| PlaybackError::OpenFailed(format!("{}: {}", path.display(), e)))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| PlaybackError::OpenFailed(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl Player for RodioPlayer {
    async fn open(&self, path: &Path) -> Result<(), PlaybackError> {
        // Probe now so a missing or undecodable source fails the session
        // before the microphone is ever touched
        open_source(path)?;
        *self.source.lock().unwrap() = Some(path.to_path_buf());
        debug!("playback source staged: {}", path.display());
        Ok(())
    }

    async fn play(&self) -> Result<PlaybackCompletion, PlaybackError> {
        let path = self
            .source
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PlaybackError::StartFailed("no source opened".into()))?;

        self.cancelled.store(false, Ordering::SeqCst);
        let cancelled = Arc::clone(&self.cancelled);

        let (ready_tx, ready_rx) = mpsc::channel::<Result<Arc<Sink>, PlaybackError>>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        std::thread::spawn(move || {
            let (_stream, handle) = match OutputStream::try_default() {
                Ok(out) => out,
                Err(e) => {
                    warn!("no audio output: {}", e);
                    let _ = ready_tx.send(Err(PlaybackError::NoOutputDevice));
                    return;
                }
            };

            let sink = match Sink::try_new(&handle) {
                Ok(sink) => Arc::new(sink),
                Err(e) => {
                    let _ = ready_tx.send(Err(PlaybackError::StartFailed(e.to_string())));
                    return;
                }
            };

            let source = match open_source(&path) {
                Ok(source) => source,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            sink.append(source);
            let _ = ready_tx.send(Ok(Arc::clone(&sink)));

            // Blocks this thread until the track drains or stop() cuts it
            sink.sleep_until_end();

            if !cancelled.load(Ordering::SeqCst) {
                debug!("playback finished naturally");
                let _ = done_tx.send(());
            }
        });

        let sink = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| PlaybackError::StartFailed(format!("task join error: {}", e)))?
            .map_err(|_| PlaybackError::StartFailed("playback thread exited".into()))??;

        *self.sink.lock().unwrap() = Some(sink);
        Ok(done_rx)
    }

    async fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Stopping the sink wakes the playback thread, which then drops the
        // output stream. Nothing here can fail; an already-finished sink
        // just goes away.
        if let Some(sink) = self.sink.lock().unwrap().take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .lock()
            .unwrap()
            .as_ref()
            .map(|sink| !sink.empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_missing_file_fails() {
        let player = RodioPlayer::new();
        let err = player
            .open(Path::new("/nonexistent/audioFile.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::OpenFailed(_)));
    }

    #[tokio::test]
    async fn open_undecodable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let player = RodioPlayer::new();
        assert!(player.open(&path).await.is_err());
    }

    #[tokio::test]
    async fn play_without_open_fails() {
        let player = RodioPlayer::new();
        let err = player.play().await.unwrap_err();
        assert!(matches!(err, PlaybackError::StartFailed(_)));
    }

    #[tokio::test]
    async fn stop_when_not_playing_is_a_noop() {
        let player = RodioPlayer::new();
        player.stop().await;
        assert!(!player.is_playing());
    }

    // Requires audio hardware; run manually
    #[tokio::test]
    #[ignore = "Requires audio hardware"]
    async fn plays_a_short_wav_to_completion() {
        use crate::domain::format::CaptureFormat;
        use std::io::Write;

        // 0.2s of silence at 16kHz
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&CaptureFormat::default().header()).unwrap();
        file.write_all(&vec![0u8; 6400]).unwrap();
        drop(file);
        crate::infrastructure::capture::patch_length(&path).unwrap();

        let player = RodioPlayer::new();
        player.open(&path).await.unwrap();
        let completion = player.play().await.unwrap();
        assert!(completion.await.is_ok());
    }
}
