//! Application configuration management
//!
//! This module handles loading configuration from an optional TOML file and
//! provider credentials from the environment. Every section of the file has
//! defaults, so an absent file yields a runnable local configuration.

use crate::core::provider::ProviderId;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 90;

/// Default server port
const DEFAULT_PORT: u16 = 3000;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";
const DEFAULT_CAPTIONS_BASE_URL: &str = "https://www.youtube.com";
const DEFAULT_CAPTIONS_LANG: &str = "en";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
        }
    }
}

/// Settings for a hosted backend that needs an API key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostedProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionsConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub openai: HostedProviderConfig,
    #[serde(default)]
    pub anthropic: HostedProviderConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub captions: CaptionsConfig,
}

/// Application configuration
///
/// Loaded once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Logging level
    pub log_level: String,

    /// Request timeout in seconds, applied to every outbound HTTP client
    pub request_timeout: u64,

    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,

    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub anthropic_model: String,

    pub ollama_base_url: String,
    pub ollama_model: String,

    /// Caption backend base URL
    pub captions_base_url: String,

    /// Caption track language
    pub captions_lang: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default())
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the TOML file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        Ok(Self::from_toml(config))
    }

    fn from_toml(config: TomlConfig) -> Self {
        Config {
            host: config.server.host,
            port: config.server.port,
            log_level: config.server.log_level,
            request_timeout: config.request.request_timeout,
            openai_api_key: non_empty(config.openai.api_key),
            openai_base_url: config
                .openai
                .base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: config
                .openai
                .model
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            anthropic_api_key: non_empty(config.anthropic.api_key),
            anthropic_base_url: config
                .anthropic
                .base_url
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            anthropic_model: config
                .anthropic
                .model
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            ollama_base_url: config
                .ollama
                .base_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: config
                .ollama
                .model
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            captions_base_url: config
                .captions
                .base_url
                .unwrap_or_else(|| DEFAULT_CAPTIONS_BASE_URL.to_string()),
            captions_lang: config
                .captions
                .lang
                .unwrap_or_else(|| DEFAULT_CAPTIONS_LANG.to_string()),
        }
    }

    /// Load configuration from environment and config file
    ///
    /// Reads `CONFIG_PATH` (default `config.toml`). A missing file falls back
    /// to defaults; credentials are then taken from the environment.
    pub fn from_env() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
                .with_context(|| format!("Invalid configuration in {}", config_path))?
        } else {
            Self::default()
        };

        config.apply_env_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override file credentials with `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = non_empty(lookup("OPENAI_API_KEY")) {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty(lookup("ANTHROPIC_API_KEY")) {
            self.anthropic_api_key = Some(key);
        }
    }

    /// Whether a provider has what it needs to make calls
    pub fn is_configured(&self, id: ProviderId) -> bool {
        match id {
            ProviderId::ChatGpt => self.openai_api_key.is_some(),
            ProviderId::Haiku => self.anthropic_api_key.is_some(),
            ProviderId::Ollama => !self.ollama_base_url.is_empty(),
        }
    }

    /// Providers that will fail every call for lack of credentials
    pub fn missing_credentials(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| !self.is_configured(*id))
            .collect()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
