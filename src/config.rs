//! Provider configuration
//!
//! Loaded from a TOML file or built in code, then handed to
//! [`GitHubProvider::new`](crate::GitHubProvider::new). Nothing here reads
//! process environment; callers decide where credentials come from.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BrowseError, Result};

/// Connection settings for the remote tree provider
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Personal access token attached to every request when present
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("repo-browser/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| BrowseError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()
    }

    /// Read a TOML config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loaded provider config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Replace the token; blank tokens clear it
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Check invariants and normalise the base URL
    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        if reqwest::Url::parse(&trimmed).is_err() {
            return Err(BrowseError::InvalidConfig {
                message: format!("api_base_url is not a valid URL: {:?}", self.api_base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(BrowseError::InvalidConfig {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        self.api_base_url = trimmed;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
