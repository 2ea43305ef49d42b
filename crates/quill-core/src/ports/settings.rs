//! Site settings port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::SiteConfig;

/// Holds the current site configuration and persists replacements.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Snapshot of the configuration in effect.
    fn current(&self) -> Arc<SiteConfig>;

    /// Re-read the backing document.
    async fn reload(&self) -> Result<Arc<SiteConfig>, SettingsError>;

    /// Persist `config` wholesale and make it current.
    async fn replace(&self, config: SiteConfig) -> Result<Arc<SiteConfig>, SettingsError>;
}

/// Settings persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Read(String),

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Failed to write settings: {0}")]
    Write(String),
}
