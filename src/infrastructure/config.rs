//! XDG config store adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("playrec");

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.exists() {
            return Ok(AppConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty_config() {
        let store = XdgConfigStore::with_path("/nonexistent/playrec/config.toml");
        let config = store.load().await.unwrap();
        assert!(config.dir.is_none());
        assert!(config.sample_rate.is_none());
    }

    #[tokio::test]
    async fn loads_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "output = \"take1.wav\"\nsample_rate = 8000\n")
            .await
            .unwrap();

        let store = XdgConfigStore::with_path(&path);
        assert!(store.exists());
        let config = store.load().await.unwrap();
        assert_eq!(config.output.as_deref(), Some("take1.wav"));
        assert_eq!(config.sample_rate, Some(8_000));
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "sample_rate = \"not a number\"")
            .await
            .unwrap();

        let store = XdgConfigStore::with_path(&path);
        assert!(matches!(
            store.load().await.unwrap_err(),
            ConfigError::ParseError(_)
        ));
    }
}
