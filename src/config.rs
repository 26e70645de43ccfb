//! Application configuration: `visuflow.toml`, `.env`, environment

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use visuflow_core::EngineConfig;
use visuflow_server::ServerConfig;
use visuflow_sources::DEFAULT_API_URL;

pub const DEFAULT_CONFIG_FILE: &str = "visuflow.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub github: GithubSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
        }
    }
}

impl AppConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `explicit` if given (must exist), else `visuflow.toml` in the
    /// working directory if present, else defaults. Environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path: Option<PathBuf> = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let mut config = match &path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let config = Self::from_toml(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `GITHUB_API_URL` and `GITHUB_TOKEN` win over the file.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("GITHUB_API_URL").filter(|v| !v.is_empty()) {
            self.github.api_url = url;
        }
        if let Some(token) = var("GITHUB_TOKEN").filter(|v| !v.is_empty()) {
            self.github.token = Some(token);
        }
    }
}
