//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the transport, the webhook server, the runtime and command settings.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Configuration for the connected chat services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub telegram: TelegramSettings,
}

/// Telegram settings as written in the file. The token may be inline or come from an
/// environment variable named by `token_env`.
#[derive(Debug, Deserialize, Clone)]
pub struct TelegramSettings {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for a single Bot API call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl TelegramSettings {
    /// Resolves the token into the explicit config handed to the transport adapter.
    pub fn resolve(&self) -> Result<TelegramConfig> {
        let token = match (&self.token, &self.token_env) {
            (Some(token), _) if !token.trim().is_empty() => token.trim().to_string(),
            (_, Some(var)) => std::env::var(var)
                .with_context(|| format!("Environment variable {var} is not set"))?,
            _ => bail!("services.telegram needs either `token` or `token_env`"),
        };
        if token.trim().is_empty() {
            bail!("Telegram token is empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("services.telegram.request_timeout_secs must be greater than zero");
        }
        Ok(TelegramConfig {
            token,
            api_url: self.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

/// Explicit configuration passed to the Telegram adapter at construction.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Compared against the `X-Telegram-Bot-Api-Secret-Token` header when set.
    #[serde(default)]
    pub secret_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            webhook_path: default_webhook_path(),
            secret_token: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_webhook_path() -> String {
    "/telegram-entity".to_string()
}

/// System-level settings for the engine and runtime.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Aliases marked authenticated when their conversation is reset.
    #[serde(default)]
    pub trusted_aliases: Vec<String>,
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            trusted_aliases: Vec::new(),
            mailbox_capacity: default_mailbox_capacity(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_mailbox_capacity() -> usize {
    32
}

fn default_idle_timeout() -> u64 {
    600
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct CommandsConfig {
    #[serde(default)]
    pub watchlist: WatchlistConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatchlistConfig {
    #[serde(default = "default_catalog")]
    pub catalog: Vec<String>,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
        }
    }
}

fn default_catalog() -> Vec<String> {
    [
        "NSKOG", "GSF", "MOWI", "SRBANK", "WSTEP", "SIOFF", "SOFF", "KOA", "FROY", "KOMP",
        "KOMPL", "VAR", "OKEA", "NHY", "FJELL", "FJORD",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
