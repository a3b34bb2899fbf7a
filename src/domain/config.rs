//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Working directory holding the reference track and recording output
    pub dir: Option<String>,
    /// Reference audio file name inside the working directory
    pub media: Option<String>,
    /// Recording output file name inside the working directory
    pub output: Option<String>,
    /// Capture sample rate in Hz
    pub sample_rate: Option<u32>,
}

impl AppConfig {
    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            dir: other.dir.or(self.dir),
            media: other.media.or(self.media),
            output: other.output.or(self.output),
            sample_rate: other.sample_rate.or(self.sample_rate),
        }
    }

    /// Working directory, defaulting to `~/recorder`
    pub fn dir_or_default(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("recorder"),
        }
    }

    /// Reference track file name, defaulting to `audioFile.wav`
    pub fn media_or_default(&self) -> &str {
        self.media.as_deref().unwrap_or("audioFile.wav")
    }

    /// Recording output file name, defaulting to `recFile.wav`
    pub fn output_or_default(&self) -> &str {
        self.output.as_deref().unwrap_or("recFile.wav")
    }

    /// Capture sample rate, defaulting to 16000 Hz
    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(16_000)
    }
}
