//! Use-case prompt building
//!
//! Maps a use case and the raw request input to either a provider call or an
//! answer synthesized without one (when prerequisite data is missing or the
//! use case is unknown).

use crate::core::constants::{text, tokens};
use crate::core::provider::{Provider, ProviderError};
use crate::fetchers::{CaptionSource, ResearcherRecord, fetch_researchers, fetch_transcript};
use crate::models::compare::UseCase;
use tracing::warn;

const CARE_GROUPS_SYSTEM_PROMPT: &str = "You are a helpful assistant that finds care groups and \
    patient support communities. Include names, locations, and contact details when available.";

const GRANTS_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides information on \
    medical grants, financial assistance programs, and patient support groups.";

const WEBINAR_SYSTEM_PROMPT: &str = "You are an assistant that analyzes patient webinar \
    transcripts. First list the people who speak or are mentioned, with their roles if stated. \
    Then list the main topics discussed.";

/// Number of prompt words used as the research topic
const TOPIC_WORDS: usize = 3;

/// Borrowed view of the request fields a use case reads
#[derive(Debug, Clone, Copy)]
pub struct UseCaseInput<'a> {
    pub use_case: Option<UseCase>,
    pub prompt: &'a str,
    pub video_url: &'a str,
}

impl UseCaseInput<'_> {
    /// Label used in per-provider error strings
    pub fn label(&self) -> &'static str {
        self.use_case.map(|u| u.as_str()).unwrap_or("prompt")
    }
}

/// What to do for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPlan {
    Call {
        system: Option<String>,
        user: String,
        max_tokens: u32,
    },
    /// Answer directly without calling the provider
    Answer(String),
}

/// First words of the prompt, used as the research topic
pub fn research_topic(prompt: &str) -> String {
    prompt
        .split_whitespace()
        .take(TOPIC_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn research_system_prompt(researchers: &[ResearcherRecord]) -> String {
    let list = researchers
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} - {}", i + 1, r.name, r.position))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a medical research assistant. Ground your answer in the work of these \
         researchers:\n{list}"
    )
}

/// Build the plan for `input` against one provider
///
/// The research use case calls `provider` once here for the researcher list.
pub async fn build_prompt(
    input: &UseCaseInput<'_>,
    provider: &dyn Provider,
    captions: &dyn CaptionSource,
) -> PromptPlan {
    let Some(use_case) = input.use_case else {
        return PromptPlan::Call {
            system: None,
            user: input.prompt.to_string(),
            max_tokens: tokens::SHORT_ANSWER,
        };
    };

    match use_case {
        UseCase::CareGroups => PromptPlan::Call {
            system: Some(CARE_GROUPS_SYSTEM_PROMPT.to_string()),
            user: format!(
                "Find care groups for patients in the following location: {}",
                input.prompt
            ),
            max_tokens: tokens::SHORT_ANSWER,
        },
        UseCase::Grants => PromptPlan::Call {
            system: Some(GRANTS_SYSTEM_PROMPT.to_string()),
            user: format!(
                "Provide information on grants and support groups based on the following query: {}",
                input.prompt
            ),
            max_tokens: tokens::SHORT_ANSWER,
        },
        UseCase::Research => {
            let topic = research_topic(input.prompt);
            let researchers = fetch_researchers(provider, &topic).await;
            if researchers.is_empty() {
                return PromptPlan::Answer(format!(
                    "Unable to retrieve researcher information for {}.",
                    topic
                ));
            }
            PromptPlan::Call {
                system: Some(research_system_prompt(&researchers)),
                user: format!(
                    "{}\n\nWhen you draw on a researcher's work, cite them by name in \
                     parentheses, for example (Jane Doe).",
                    input.prompt
                ),
                max_tokens: tokens::LONG_ANSWER,
            }
        }
        UseCase::PatientWebinars => match fetch_transcript(captions, input.video_url).await {
            Ok(transcript) => PromptPlan::Call {
                system: Some(WEBINAR_SYSTEM_PROMPT.to_string()),
                user: format!("Analyze the following webinar transcript:\n\n{}", transcript),
                max_tokens: tokens::LONG_ANSWER,
            },
            Err(e) => {
                warn!("Webinar transcript for '{}' unavailable: {}", input.video_url, e);
                PromptPlan::Answer(text::WEBINAR_UNAVAILABLE.to_string())
            }
        },
        UseCase::Unknown => PromptPlan::Answer(text::INVALID_USE_CASE.to_string()),
    }
}

/// Run one provider's full flow and apply the use-case intro
pub async fn run_use_case(
    input: &UseCaseInput<'_>,
    provider: &dyn Provider,
    captions: &dyn CaptionSource,
) -> Result<String, ProviderError> {
    let answer = match build_prompt(input, provider, captions).await {
        PromptPlan::Call {
            system,
            user,
            max_tokens,
        } => provider.respond(system.as_deref(), &user, max_tokens).await?,
        PromptPlan::Answer(answer) => answer,
    };

    Ok(match input.use_case.and_then(|u| u.intro()) {
        Some(intro) => format!("{}\n\n{}", intro, answer),
        None => answer,
    })
}
