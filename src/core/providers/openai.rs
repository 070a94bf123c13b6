//! OpenAI provider implementation (the `chatgpt` slot)

use crate::core::constants::role;
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::{build_client, endpoint, ensure_success};
use crate::models::openai::{
    OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIMessage,
};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// OpenAI chat completions provider
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key; calls fail with `Authentication` when absent
    /// * `base_url` - OpenAI API base URL
    /// * `model` - Chat model identifier
    /// * `timeout` - Request timeout in seconds
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

    /// Classify OpenAI errors and provide helpful messages
    fn classify_error(error_detail: &str) -> String {
        let error_lower = error_detail.to_lowercase();

        if error_lower.contains("unsupported_country_region_territory")
            || error_lower.contains("country, region, or territory not supported")
        {
            return "OpenAI API is not available in your region.".to_string();
        }

        if error_lower.contains("invalid_api_key") || error_lower.contains("unauthorized") {
            return "Invalid API key. Please check your OPENAI_API_KEY configuration.".to_string();
        }

        if error_lower.contains("rate_limit") || error_lower.contains("quota") {
            return "Rate limit exceeded. Please wait and try again, or upgrade your API plan."
                .to_string();
        }

        if error_lower.contains("model")
            && (error_lower.contains("not found") || error_lower.contains("does not exist"))
        {
            return "Model not found. Please check the [openai] model setting.".to_string();
        }

        error_detail.to_string()
    }

    fn build_request(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> OpenAIChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(OpenAIMessage {
                role: role::SYSTEM.to_string(),
                content: Some(system.to_string()),
            });
        }
        messages.push(OpenAIMessage {
            role: role::USER.to_string(),
            content: Some(user.to_string()),
        });

        OpenAIChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(max_tokens),
            stream: false,
        }
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn respond(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Authentication("OPENAI_API_KEY is not set".to_string()))?;

        let request = self.build_request(system, user, max_tokens);
        debug!("OpenAI request: model={}, max_tokens={}", request.model, max_tokens);

        let response = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unexpected(e.to_string()))?;

        let response = ensure_success(response, Self::classify_error).await?;

        let completion: OpenAIChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProviderError::Unexpected("Response contained no choices".to_string()))
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, api_key: Option<&str>) -> OpenAIProvider {
        OpenAIProvider::new(
            api_key.map(String::from),
            base_url.to_string(),
            "gpt-3.5-turbo".to_string(),
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_classify_region_error() {
        let result = OpenAIProvider::classify_error("unsupported_country_region_territory");
        assert!(result.contains("region"));
    }

    #[test]
    fn test_classify_auth_error() {
        let result = OpenAIProvider::classify_error("invalid_api_key: The API key is invalid");
        assert!(result.contains("API key"));
    }

    #[test]
    fn test_system_prompt_is_first_message() {
        let provider = provider("http://unused", Some("sk-test"));
        let request = provider.build_request(Some("be brief"), "hello", 150);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content.as_deref(), Some("hello"));

        let request = provider.build_request(None, "hello", 150);
        assert_eq!(request.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_respond_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 150
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-3.5-turbo",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "  Hello there \n" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
            })))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Some("sk-test"));
        let text = provider.respond(None, "hi", 150).await.unwrap();
        assert_eq!(text, "Hello there");
    }

    #[tokio::test]
    async fn test_respond_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate_limit_exceeded"))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server.uri(), Some("sk-test"));
        let err = provider.respond(None, "hi", 150).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimit(_)));
    }

    #[tokio::test]
    async fn test_respond_without_key() {
        let provider = provider("http://127.0.0.1:1", None);
        let err = provider.respond(None, "hi", 150).await.unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }
}
