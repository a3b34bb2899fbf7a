//! Config store port

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for loading persisted configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the config, returning an empty config if none exists
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Check if a config file exists
    fn exists(&self) -> bool;

    /// Path to the config file, for diagnostics
    fn path(&self) -> &std::path::Path;
}
