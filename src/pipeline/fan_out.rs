//! Concurrent fan-out across the selected providers
//!
//! Every selected provider's flow is polled together on the request task and
//! the merge waits for all of them. A failure (error or panic) in one flow
//! only replaces that provider's slot with an error string.

use crate::core::provider::{ProviderId, ProviderSet};
use crate::fetchers::CaptionSource;
use crate::models::compare::{CompareResponse, ModelSelector};
use crate::pipeline::use_case::{UseCaseInput, run_use_case};
use futures::FutureExt;
use futures::future::join_all;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

/// Slot text for a provider whose flow failed
pub fn error_text(label: &str, provider: ProviderId) -> String {
    format!("Error: Unable to process {} with {}", label, provider)
}

/// Run `input` against every provider in `selector` and merge the answers
pub async fn fan_out(
    providers: &ProviderSet,
    captions: &dyn CaptionSource,
    selector: ModelSelector,
    input: &UseCaseInput<'_>,
) -> CompareResponse {
    let flows = selector.providers().iter().map(|&id| async move {
        let provider = providers.get(id);
        let outcome = AssertUnwindSafe(run_use_case(input, provider.as_ref(), captions))
            .catch_unwind()
            .await;
        (id, outcome)
    });

    let mut response = CompareResponse::default();

    for (id, outcome) in join_all(flows).await {
        let text = match outcome {
            Ok(Ok(answer)) => {
                debug!("{} response: {}", id, answer);
                answer
            }
            Ok(Err(e)) => {
                error!("Error processing {} with {}: {}", input.label(), id, e);
                error_text(input.label(), id)
            }
            Err(_) => {
                error!("Provider flow for {} panicked while processing {}", id, input.label());
                error_text(input.label(), id)
            }
        };
        response.insert(id, text);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{Provider, ProviderError};
    use crate::fetchers::transcript::{CaptionFragment, TranscriptError};
    use crate::models::compare::UseCase;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Answer(&'static str),
        Fail,
        Panic,
        /// Answer after a delay, so siblings finish first
        Slow(&'static str),
    }

    struct MockProvider {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Provider for MockProvider {
        async fn respond(
            &self,
            _system: Option<&str>,
            user: &str,
            _max_tokens: u32,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer(text) => Ok(format!("{} <- {}", text, user)),
                Behavior::Fail => Err(ProviderError::ApiError {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
                Behavior::Panic => panic!("adapter bug"),
                Behavior::Slow(text) => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(text.to_string())
                }
            }
        }

        fn provider_name(&self) -> &str {
            "mock"
        }
    }

    struct NoCaptions;

    #[async_trait]
    impl CaptionSource for NoCaptions {
        async fn fetch_captions(
            &self,
            _video_id: &str,
        ) -> Result<Vec<CaptionFragment>, TranscriptError> {
            Err(TranscriptError::Unavailable("offline".to_string()))
        }
    }

    fn set(chatgpt: Arc<MockProvider>, haiku: Arc<MockProvider>, ollama: Arc<MockProvider>) -> ProviderSet {
        ProviderSet {
            chatgpt,
            haiku,
            ollama,
        }
    }

    fn plain(prompt: &str) -> UseCaseInput<'_> {
        UseCaseInput {
            use_case: None,
            prompt,
            video_url: "",
        }
    }

    #[tokio::test]
    async fn test_all_selects_three_providers() {
        let providers = set(
            MockProvider::new(Behavior::Answer("a")),
            MockProvider::new(Behavior::Answer("b")),
            MockProvider::new(Behavior::Answer("c")),
        );
        let response = fan_out(&providers, &NoCaptions, ModelSelector::All, &plain("hi")).await;
        assert_eq!(response.len(), 3);
        assert_eq!(response.chatgpt.as_deref(), Some("a <- hi"));
        assert_eq!(response.haiku.as_deref(), Some("b <- hi"));
        assert_eq!(response.ollama.as_deref(), Some("c <- hi"));
    }

    #[tokio::test]
    async fn test_failing_provider_is_isolated() {
        let haiku = MockProvider::new(Behavior::Fail);
        let providers = set(
            MockProvider::new(Behavior::Answer("a")),
            haiku.clone(),
            MockProvider::new(Behavior::Slow("c")),
        );
        let input = UseCaseInput {
            use_case: Some(UseCase::Grants),
            prompt: "q",
            video_url: "",
        };
        let response = fan_out(&providers, &NoCaptions, ModelSelector::All, &input).await;

        assert_eq!(response.len(), 3);
        assert!(response.chatgpt.as_deref().unwrap().contains("a <- Provide information"));
        assert_eq!(
            response.haiku.as_deref(),
            Some("Error: Unable to process grants with haiku")
        );
        assert!(response.ollama.as_deref().unwrap().ends_with("\n\nc"));
        assert_eq!(haiku.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_provider_is_isolated() {
        let providers = set(
            MockProvider::new(Behavior::Panic),
            MockProvider::new(Behavior::Answer("b")),
            MockProvider::new(Behavior::Answer("c")),
        );
        let response = fan_out(&providers, &NoCaptions, ModelSelector::All, &plain("hi")).await;
        assert_eq!(
            response.chatgpt.as_deref(),
            Some("Error: Unable to process prompt with chatgpt")
        );
        assert_eq!(response.haiku.as_deref(), Some("b <- hi"));
    }

    #[tokio::test]
    async fn test_every_provider_failing_still_fills_slots() {
        let providers = set(
            MockProvider::new(Behavior::Fail),
            MockProvider::new(Behavior::Fail),
            MockProvider::new(Behavior::Fail),
        );
        let response = fan_out(&providers, &NoCaptions, ModelSelector::All, &plain("hi")).await;
        assert_eq!(response.len(), 3);
        for id in ProviderId::ALL {
            assert_eq!(response.get(id), Some(error_text("prompt", id).as_str()));
        }
    }

    #[tokio::test]
    async fn test_pair_and_single_selectors() {
        let ollama = MockProvider::new(Behavior::Answer("c"));
        let providers = set(
            MockProvider::new(Behavior::Answer("a")),
            MockProvider::new(Behavior::Answer("b")),
            ollama.clone(),
        );

        let pair = fan_out(&providers, &NoCaptions, ModelSelector::ClaudeChatGpt, &plain("hi")).await;
        assert!(pair.chatgpt.is_some() && pair.haiku.is_some());
        assert!(pair.ollama.is_none());
        assert_eq!(ollama.calls.load(Ordering::SeqCst), 0);

        let single = fan_out(&providers, &NoCaptions, ModelSelector::Ollama, &plain("hi")).await;
        assert_eq!(single.len(), 1);
        assert_eq!(single.ollama.as_deref(), Some("c <- hi"));
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let providers = set(
            MockProvider::new(Behavior::Answer("a")),
            MockProvider::new(Behavior::Fail),
            MockProvider::new(Behavior::Slow("c")),
        );
        let input = UseCaseInput {
            use_case: Some(UseCase::CareGroups),
            prompt: "Denver",
            video_url: "",
        };
        let first = fan_out(&providers, &NoCaptions, ModelSelector::All, &input).await;
        let second = fan_out(&providers, &NoCaptions, ModelSelector::All, &input).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_webinar_failure_text_for_every_provider() {
        let providers = set(
            MockProvider::new(Behavior::Answer("a")),
            MockProvider::new(Behavior::Answer("b")),
            MockProvider::new(Behavior::Answer("c")),
        );
        let input = UseCaseInput {
            use_case: Some(UseCase::PatientWebinars),
            prompt: "",
            video_url: "https://www.youtube.com/watch?v=abc",
        };
        let response = fan_out(&providers, &NoCaptions, ModelSelector::All, &input).await;
        for id in ProviderId::ALL {
            assert!(response
                .get(id)
                .unwrap()
                .ends_with("\n\nError: Unable to analyze the webinar"));
        }
    }
}
