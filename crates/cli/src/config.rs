//! Configuration loading from mcs.toml.

use rest_http::RestHttpConfig;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// REST driver options (`[driver]` table).
    pub driver: RestHttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Configuration for the given spec URLs with default driver options.
    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            driver: RestHttpConfig::new(urls),
        }
    }

    /// Apply command-line overrides.
    ///
    /// Non-empty `urls` replace the configured list.
    pub fn with_overrides(mut self, urls: Vec<String>, reduced: bool) -> Self {
        if !urls.is_empty() {
            self.driver.urls = urls;
        }
        if reduced {
            self.driver.reduced_spec = true;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
