//! Provider implementations

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

use crate::core::provider::ProviderError;
use reqwest::{Client, Response};
use std::time::Duration;

/// Build the HTTP client an adapter keeps for the life of the process
pub(crate) fn build_client(timeout: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(|e| ProviderError::Unexpected(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success response into a classified `ProviderError`
pub(crate) async fn ensure_success(
    response: Response,
    classify: fn(&str) -> String,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(ProviderError::from_status(status.as_u16(), classify(&error_text)))
}

/// Join a base URL and an endpoint path without doubling the slash
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://localhost:11434", "api/chat"),
            "http://localhost:11434/api/chat"
        );
    }
}
