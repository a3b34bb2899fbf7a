//! Main app runner

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::application::ports::ConfigStore;
use crate::application::{SessionController, SessionPaths};
use crate::domain::config::AppConfig;
use crate::domain::format::CaptureFormat;
use crate::domain::session::SessionState;
use crate::infrastructure::{CpalCapture, RodioPlayer, XdgConfigStore};

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Resolved options for one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Working directory, created if missing
    pub dir: PathBuf,
    /// Reference track to play
    pub media: PathBuf,
    /// WAV file to record to, overwritten per run
    pub recording: PathBuf,
    /// Capture format
    pub format: CaptureFormat,
}

impl RunOptions {
    /// Resolve run options from a merged config
    pub fn from_config(config: &AppConfig) -> Self {
        let dir = config.dir_or_default();
        Self {
            media: dir.join(config.media_or_default()),
            recording: dir.join(config.output_or_default()),
            format: CaptureFormat::mono_16bit(config.sample_rate_or_default()),
            dir,
        }
    }
}

/// Load file config and merge CLI flags over it
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring config file {}: {}", store.path().display(), e);
            AppConfig::empty()
        }
    };
    file_config.merge(cli_config)
}

/// Run one playback-and-capture session to completion
pub async fn run(options: RunOptions) -> ExitCode {
    let presenter = Presenter::new();

    // The packaged-asset copy of the original is platform glue; here the
    // user supplies the reference track, so check the layout up front
    if let Err(e) = tokio::fs::create_dir_all(&options.dir).await {
        presenter.error(&format!(
            "cannot create working directory {}: {}",
            options.dir.display(),
            e
        ));
        return ExitCode::from(EXIT_ERROR);
    }
    if !options.media.exists() {
        presenter.error(&format!(
            "reference track not found: {} (place an audio file there or pass --media)",
            options.media.display()
        ));
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let player = Arc::new(RodioPlayer::new());
    let capture = Arc::new(CpalCapture::new(options.format));
    let controller = SessionController::new(
        Arc::clone(&player),
        Arc::clone(&capture),
        SessionPaths {
            media: options.media.clone(),
            recording: options.recording.clone(),
        },
    );

    if let Err(e) = controller.start().await {
        presenter.error(&format!("cannot start session: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.info(&format!(
        "playing {} and recording to {}",
        options.media.display(),
        options.recording.display()
    ));
    presenter.info("press Ctrl-C to stop early");

    // The session stops itself when playback completes; Ctrl-C stops it
    // early. Either way the controller ends up idle.
    let interrupted = wait_for_idle_or_interrupt(&controller).await;
    if interrupted {
        presenter.warn("interrupted, stopping session");
        if let Err(e) = controller.stop().await {
            warn!("stop after interrupt: {}", e);
        }
    }

    // Unconditional teardown so nothing leaks even on odd paths
    controller.shutdown().await;

    // The header patch runs detached from teardown; wait for it before
    // exiting so the recording is not left with placeholder sizes
    capture.finish().await;

    match outcome_notice(&options.recording) {
        Ok(msg) => presenter.success(&msg),
        Err(msg) => presenter.warn(&msg),
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Final user notice for a finished session. A degraded session (microphone
/// unavailable) leaves no file behind and must not be reported as saved.
fn outcome_notice(recording: &Path) -> Result<String, String> {
    if recording.exists() {
        Ok(format!("recording saved to {}", recording.display()))
    } else {
        Err(format!(
            "microphone was unavailable, no recording written to {}",
            recording.display()
        ))
    }
}

/// Poll the session until it returns to idle; true if Ctrl-C arrived first
async fn wait_for_idle_or_interrupt<P, C>(controller: &SessionController<P, C>) -> bool
where
    P: crate::application::ports::Player + 'static,
    C: crate::application::ports::CaptureEngine + 'static,
{
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return true,
            _ = tokio::time::sleep(Duration::from_millis(200)) => {
                if controller.state().await == SessionState::Idle {
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_resolve_inside_working_dir() {
        let config = AppConfig {
            dir: Some("/data/recorder".into()),
            media: None,
            output: None,
            sample_rate: Some(44_100),
        };
        let options = RunOptions::from_config(&config);

        assert_eq!(options.dir, PathBuf::from("/data/recorder"));
        assert_eq!(options.media, PathBuf::from("/data/recorder/audioFile.wav"));
        assert_eq!(
            options.recording,
            PathBuf::from("/data/recorder/recFile.wav")
        );
        assert_eq!(options.format.sample_rate, 44_100);
        assert_eq!(options.format.channels, 1);
    }

    #[test]
    fn outcome_notice_reports_saved_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recFile.wav");
        std::fs::write(&path, [0u8; 44]).unwrap();

        let msg = outcome_notice(&path).unwrap();
        assert!(msg.contains("recording saved"));
    }

    #[test]
    fn outcome_notice_warns_when_no_recording_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recFile.wav");

        let msg = outcome_notice(&path).unwrap_err();
        assert!(msg.contains("no recording written"));
    }

    #[test]
    fn cli_flags_override_defaults_after_merge() {
        let cli = AppConfig {
            output: Some("take2.wav".into()),
            ..AppConfig::empty()
        };
        let merged = AppConfig::empty().merge(cli);
        let options = RunOptions::from_config(&merged);
        assert!(options.recording.ends_with("take2.wav"));
        assert_eq!(options.format.sample_rate, 16_000);
    }
}
