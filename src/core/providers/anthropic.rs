//! Anthropic provider implementation (the `haiku` slot)

use crate::core::constants::{anthropic, role};
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::{build_client, endpoint, ensure_success};
use crate::models::anthropic::{
    AnthropicMessage, AnthropicMessagesRequest, AnthropicMessagesResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        timeout: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            base_url,
            model,
        })
    }

    fn classify_error(error_detail: &str) -> String {
        let error_lower = error_detail.to_lowercase();

        if error_lower.contains("authentication_error") || error_lower.contains("x-api-key") {
            return "Invalid API key. Please check your ANTHROPIC_API_KEY configuration."
                .to_string();
        }

        if error_lower.contains("overloaded_error") {
            return "Anthropic API is overloaded. Please try again later.".to_string();
        }

        if error_lower.contains("not_found_error") && error_lower.contains("model") {
            return "Model not found. Please check the [anthropic] model setting.".to_string();
        }

        error_detail.to_string()
    }

    fn build_request(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> AnthropicMessagesRequest {
        AnthropicMessagesRequest {
            model: self.model.clone(),
            max_tokens,
            system: system.map(String::from),
            messages: vec![AnthropicMessage {
                role: role::USER.to_string(),
                content: user.to_string(),
            }],
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn respond(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Authentication("ANTHROPIC_API_KEY is not set".to_string())
        })?;

        let request = self.build_request(system, user, max_tokens);
        debug!("Anthropic request: model={}, max_tokens={}", request.model, max_tokens);

        let response = self
            .client
            .post(endpoint(&self.base_url, "v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", anthropic::API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?;

        let response = ensure_success(response, Self::classify_error).await?;

        let message: AnthropicMessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        message
            .content
            .into_iter()
            .find(|block| block.content_type == anthropic::TEXT_BLOCK)
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::Unexpected("Response contained no text block".to_string()))
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> AnthropicProvider {
        AnthropicProvider::new(
            Some("sk-ant-test".to_string()),
            base_url.to_string(),
            "claude-3-haiku-20240307".to_string(),
            5,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_respond_sends_system_as_top_level_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 1000,
                "system": "You analyze transcripts.",
                "messages": [{ "role": "user", "content": "transcript" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "text", "text": "Two speakers." }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 10, "output_tokens": 3 }
            })))
            .mount(&mock_server)
            .await;

        let text = provider(&mock_server.uri())
            .respond(Some("You analyze transcripts."), "transcript", 1000)
            .await
            .unwrap();
        assert_eq!(text, "Two speakers.");
    }

    #[tokio::test]
    async fn test_respond_auth_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "type": "error",
                "error": { "type": "authentication_error", "message": "invalid x-api-key" }
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server.uri())
            .respond(None, "hi", 150)
            .await
            .unwrap_err();
        match err {
            ProviderError::Authentication(message) => assert!(message.contains("ANTHROPIC_API_KEY")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_respond_without_text_block() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "content": []
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server.uri())
            .respond(None, "hi", 150)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unexpected(_)));
    }
}
