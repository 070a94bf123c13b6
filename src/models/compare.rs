//! Browser-facing request and response types for `/api/compare`

use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which providers a request fans out to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSelector {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "chatgpt")]
    ChatGpt,
    #[serde(rename = "haiku")]
    Haiku,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "claude-chatgpt")]
    ClaudeChatGpt,
}

impl ModelSelector {
    /// Providers selected, in response-key order
    pub fn providers(&self) -> &'static [ProviderId] {
        match self {
            ModelSelector::All => &[ProviderId::ChatGpt, ProviderId::Haiku, ProviderId::Ollama],
            ModelSelector::ClaudeChatGpt => &[ProviderId::ChatGpt, ProviderId::Haiku],
            ModelSelector::ChatGpt => &[ProviderId::ChatGpt],
            ModelSelector::Haiku => &[ProviderId::Haiku],
            ModelSelector::Ollama => &[ProviderId::Ollama],
        }
    }
}

/// Task template applied to the prompt before it reaches a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UseCase {
    CareGroups,
    PatientWebinars,
    Research,
    Grants,
    /// Any tag the router does not recognize
    #[serde(other)]
    Unknown,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::CareGroups => "careGroups",
            UseCase::PatientWebinars => "patientWebinars",
            UseCase::Research => "research",
            UseCase::Grants => "grants",
            UseCase::Unknown => "unknown",
        }
    }

    /// Text prepended to every answer for this use case
    pub fn intro(&self) -> Option<&'static str> {
        match self {
            UseCase::CareGroups => Some(
                "Here are care groups and community resources that may support patients in this area:",
            ),
            UseCase::PatientWebinars => {
                Some("Here is a summary of the people and topics covered in this webinar:")
            }
            UseCase::Research => {
                Some("Here is an overview of current research, with leading researchers in the field:")
            }
            UseCase::Grants => {
                Some("Here are grants and support groups that may be relevant to your situation:")
            }
            UseCase::Unknown => None,
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// POST /api/compare body
///
/// `model` is kept raw so the input check runs before the selector is
/// validated; see [`CompareRequest::selector`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub use_case: Option<UseCase>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl CompareRequest {
    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("").trim()
    }

    pub fn video_url(&self) -> &str {
        self.video_url.as_deref().unwrap_or("").trim()
    }

    /// A request must carry a prompt or a video reference
    pub fn has_input(&self) -> bool {
        !self.prompt().is_empty() || !self.video_url().is_empty()
    }

    /// Parse `model`; a missing or unrecognized selector is an error
    pub fn selector(&self) -> Result<ModelSelector, serde_json::Error> {
        serde_json::from_value(self.model.clone().unwrap_or(Value::Null))
    }
}

/// POST /api/compare/{provider} body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleProviderRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Merged per-provider answers; unrequested providers are omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chatgpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haiku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<String>,
}

impl CompareResponse {
    pub fn insert(&mut self, id: ProviderId, text: String) {
        *self.slot_mut(id) = Some(text);
    }

    pub fn get(&self, id: ProviderId) -> Option<&str> {
        match id {
            ProviderId::ChatGpt => self.chatgpt.as_deref(),
            ProviderId::Haiku => self.haiku.as_deref(),
            ProviderId::Ollama => self.ollama.as_deref(),
        }
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        ProviderId::ALL
            .iter()
            .filter(|id| self.get(**id).is_some())
            .count()
    }

    fn slot_mut(&mut self, id: ProviderId) -> &mut Option<String> {
        match id {
            ProviderId::ChatGpt => &mut self.chatgpt,
            ProviderId::Haiku => &mut self.haiku,
            ProviderId::Ollama => &mut self.ollama,
        }
    }
}
