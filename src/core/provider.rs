//! Provider abstraction layer for the LLM backends
//!
//! This module defines the common trait every backend adapter implements,
//! the fixed set of provider identities, and the set of long-lived clients
//! shared by all requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error types for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::Authentication(message),
            429 => ProviderError::RateLimit(message),
            400 => ProviderError::BadRequest(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

/// Trait for LLM API providers
///
/// An adapter takes an optional system prompt and a user prompt and returns
/// the backend's single text completion. Calls are never retried.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send one chat request bounded by `max_tokens` output tokens
    async fn respond(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Identity of one of the three fixed backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Haiku,
    Ollama,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::ChatGpt, ProviderId::Haiku, ProviderId::Ollama];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::ChatGpt => "chatgpt",
            ProviderId::Haiku => "haiku",
            ProviderId::Ollama => "ollama",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chatgpt" => Some(ProviderId::ChatGpt),
            "haiku" => Some(ProviderId::Haiku),
            "ollama" => Some(ProviderId::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One client handle per backend, built once at startup
#[derive(Clone)]
pub struct ProviderSet {
    pub chatgpt: Arc<dyn Provider>,
    pub haiku: Arc<dyn Provider>,
    pub ollama: Arc<dyn Provider>,
}

impl ProviderSet {
    pub fn get(&self, id: ProviderId) -> &Arc<dyn Provider> {
        match id {
            ProviderId::ChatGpt => &self.chatgpt,
            ProviderId::Haiku => &self.haiku,
            ProviderId::Ollama => &self.ollama,
        }
    }
}
