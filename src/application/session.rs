//! Session controller use case
//!
//! Coordinates the playback collaborator and the capture engine around one
//! session state machine. At most one session is active at a time, and the
//! session terminates itself when the reference track finishes playing.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::session::{InvalidStateTransition, Session, SessionState};

use super::ports::{CaptureEngine, PlaybackError, Player};

/// Errors from the session use case
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

/// Filesystem layout for one session
#[derive(Debug, Clone)]
pub struct SessionPaths {
    /// Reference track to play
    pub media: PathBuf,
    /// WAV file the microphone is captured to (overwritten every session)
    pub recording: PathBuf,
}

/// Session controller.
///
/// Start order matters: the playback source is validated first (a missing
/// source must never start the microphone), capture begins second, playback
/// third, so the recording spans the whole playback duration including
/// startup latency.
pub struct SessionController<P, C>
where
    P: Player + 'static,
    C: CaptureEngine + 'static,
{
    player: Arc<P>,
    capture: Arc<C>,
    session: Arc<Mutex<Session>>,
    paths: SessionPaths,
}

impl<P, C> Clone for SessionController<P, C>
where
    P: Player + 'static,
    C: CaptureEngine + 'static,
{
    fn clone(&self) -> Self {
        Self {
            player: Arc::clone(&self.player),
            capture: Arc::clone(&self.capture),
            session: Arc::clone(&self.session),
            paths: self.paths.clone(),
        }
    }
}

impl<P, C> SessionController<P, C>
where
    P: Player + 'static,
    C: CaptureEngine + 'static,
{
    /// Create a new controller with the given adapters
    pub fn new(player: Arc<P>, capture: Arc<C>, paths: SessionPaths) -> Self {
        Self {
            player,
            capture,
            session: Arc::new(Mutex::new(Session::new())),
            paths,
        }
    }

    /// Get the current session state
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Start a session: open the reference track, begin capture, play.
    ///
    /// Fails with `InvalidState` if a session is already underway (the
    /// existing session is untouched) and with `Playback` if the source
    /// cannot be opened (the session reverts to idle and capture is never
    /// started).
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut session = self.session.lock().await;
            session.begin_start()?;
        }

        if let Err(e) = self.player.open(&self.paths.media).await {
            debug!("playback source rejected: {}", e);
            self.revert_start().await;
            return Err(e.into());
        }

        // Capture starts only after the source is validated and before
        // playback begins, so the recording covers startup latency. A
        // microphone failure is a degraded mode, not a session failure.
        self.capture.begin(&self.paths.recording).await;

        let completion = match self.player.play().await {
            Ok(rx) => rx,
            Err(e) => {
                warn!("playback failed to start: {}", e);
                self.capture.end().await;
                self.revert_start().await;
                return Err(e.into());
            }
        };

        {
            let mut session = self.session.lock().await;
            session.activate()?;
        }
        debug!("session active: playing {:?}", self.paths.media);

        // Self-terminating session: when the track ends on its own, stop.
        // A concurrent explicit stop() simply wins the state machine race
        // and this stop becomes a no-op.
        let controller = self.clone();
        tokio::spawn(async move {
            if completion.await.is_ok() {
                debug!("playback complete, stopping session");
                let _ = controller.stop().await;
            }
        });

        Ok(())
    }

    /// Stop the session: halt playback, end capture, return to idle.
    ///
    /// Fails with `InvalidState` if no session is underway; no I/O is
    /// performed in that case. Player teardown errors are swallowed so a
    /// faulty player can never block recorder teardown.
    pub async fn stop(&self) -> Result<(), SessionError> {
        {
            let mut session = self.session.lock().await;
            session.begin_stop()?;
        }

        self.player.stop().await;
        self.capture.end().await;

        {
            let mut session = self.session.lock().await;
            session.finish_stop()?;
        }
        debug!("session stopped");

        Ok(())
    }

    /// Teardown hook: stop unconditionally so the microphone and any open
    /// file handle are never leaked. Safe to call in any state.
    pub async fn shutdown(&self) {
        if let Err(e) = self.stop().await {
            debug!("shutdown with no session underway: {}", e);
        }
    }

    async fn revert_start(&self) {
        let mut session = self.session.lock().await;
        if let Err(e) = session.abort_start() {
            warn!("could not revert session startup: {}", e);
        }
    }
}
