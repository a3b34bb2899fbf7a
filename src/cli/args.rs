//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::Parser;

use crate::domain::config::AppConfig;

/// Playrec - play a reference track while recording the microphone
#[derive(Parser, Debug)]
#[command(name = "playrec")]
#[command(version)]
#[command(about = "Play a reference track while recording the microphone to a WAV file")]
#[command(long_about = None)]
pub struct Cli {
    /// Working directory holding the reference track and the recording
    #[arg(short = 'C', long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Reference audio file name inside the working directory
    #[arg(short = 'm', long, value_name = "FILE")]
    pub media: Option<String>,

    /// Recording output file name inside the working directory
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<String>,

    /// Capture sample rate in Hz
    #[arg(short = 'r', long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
}

impl Cli {
    /// Convert the parsed arguments into a partial config for merging
    pub fn into_config(self) -> AppConfig {
        AppConfig {
            dir: self.dir.map(|p| p.display().to_string()),
            media: self.media,
            output: self.output,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "playrec",
            "-C",
            "/tmp/recorder",
            "--media",
            "ref.wav",
            "-o",
            "take.wav",
            "-r",
            "44100",
        ]);
        assert_eq!(cli.dir.as_deref(), Some(std::path::Path::new("/tmp/recorder")));
        assert_eq!(cli.media.as_deref(), Some("ref.wav"));
        assert_eq!(cli.output.as_deref(), Some("take.wav"));
        assert_eq!(cli.sample_rate, Some(44_100));
    }

    #[test]
    fn defaults_are_all_none() {
        let config = Cli::parse_from(["playrec"]).into_config();
        assert!(config.dir.is_none());
        assert!(config.media.is_none());
        assert!(config.output.is_none());
        assert!(config.sample_rate.is_none());
    }
}
