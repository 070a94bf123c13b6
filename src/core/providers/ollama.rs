//! Ollama provider implementation (the `ollama` slot)
//!
//! Talks to a local or self-hosted Ollama server; no credentials.

use crate::core::constants::role;
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::{build_client, endpoint, ensure_success};
use crate::models::ollama::{OllamaChatRequest, OllamaChatResponse, OllamaMessage, OllamaOptions};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String, timeout: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            model,
        })
    }

    fn classify_error(error_detail: &str) -> String {
        if error_detail.to_lowercase().contains("not found") {
            return format!("{} (try `ollama pull` for the configured model)", error_detail);
        }
        error_detail.to_string()
    }

    fn build_request(&self, system: Option<&str>, user: &str, max_tokens: u32) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(OllamaMessage {
                role: role::SYSTEM.to_string(),
                content: system.to_string(),
            });
        }
        messages.push(OllamaMessage {
            role: role::USER.to_string(),
            content: user.to_string(),
        });

        OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: Some(OllamaOptions {
                num_predict: max_tokens,
            }),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn respond(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let request = self.build_request(system, user, max_tokens);
        debug!("Ollama request: model={}, num_predict={}", request.model, max_tokens);

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?;

        let response = ensure_success(response, Self::classify_error).await?;

        let chat: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        Ok(chat.message.content)
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }
}
