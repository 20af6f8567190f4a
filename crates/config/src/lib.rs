//! Configuration for ebisu
//!
//! One explicit [`Config`] struct, loaded from `~/.ebisu/config.json` and
//! overlaid with environment variables exactly once at startup. Clients
//! receive their section by reference; a missing credential is not a startup
//! error, each client raises it on first use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod paths;

pub use paths::{config_path, data_dir, sessions_dir};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Language-model access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// Apollo people/organization data provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApolloConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_apollo_endpoint")]
    pub endpoint: String,
}

impl Default for ApolloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_apollo_endpoint(),
        }
    }
}

fn default_apollo_endpoint() -> String {
    "https://api.apollo.io".to_string()
}

/// Unipile LinkedIn gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnipileConfig {
    /// Instance hostname; an `https://` prefix is added when absent
    #[serde(default)]
    pub dsn: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

/// Agent behavior defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Reply language mentioned in the system prompt
    #[serde(default = "default_language")]
    pub language: String,
    /// Safety cap on tool rounds per turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// Message-window size kept in a persisted session
    #[serde(default = "default_session_max_messages")]
    pub session_max_messages: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_tool_rounds: default_max_tool_rounds(),
            session_max_messages: default_session_max_messages(),
        }
    }
}

fn default_language() -> String {
    "english".to_string()
}

fn default_max_tool_rounds() -> u32 {
    20
}

fn default_session_max_messages() -> usize {
    100
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub apollo: ApolloConfig,
    #[serde(default)]
    pub unipile: UnipileConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Config {
    /// Load from the default location, falling back to defaults
    pub async fn load() -> Result<Self> {
        Self::load_from(&config_path()).await
    }

    /// Load from a specific file; a missing file yields defaults
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load, then overlay environment variables
    pub async fn load_with_env() -> Result<Self> {
        let mut config = Self::load().await?;
        config.apply_env();
        Ok(config)
    }

    /// Overlay credentials from the process environment, read once
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            self.model.api_base = Some(base);
        }
        if let Ok(key) = std::env::var("APOLLO_API_KEY") {
            self.apollo.api_key = Some(key);
        }
        // Historical variable name from the original deployment
        if let Ok(dsn) = std::env::var("UNIPILE_DNS") {
            self.unipile.dsn = Some(dsn);
        }
        if let Ok(key) = std::env::var("UNIPILE_API_KEY") {
            self.unipile.api_key = Some(key);
        }
        if let Ok(account) = std::env::var("UNIPILE_ACCOUNT_ID") {
            self.unipile.account_id = Some(account);
        }
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        self.save_to(&config_path()).await
    }

    /// Save to a specific file, creating parent directories
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("saving config to {:?}", path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Initialize the config file and data directories
pub async fn init() -> Result<Config> {
    let path = config_path();

    if path.exists() {
        info!("config already exists at {:?}", path);
    } else {
        let config = Config::default();
        config.save_to(&path).await?;
        info!("config created at {:?}", path);
    }

    tokio::fs::create_dir_all(sessions_dir()).await?;

    Config::load().await
}
