//! Video transcript retrieval
//!
//! A transcript is the caption track of a video joined into one string. The
//! caption backend sits behind [`CaptionSource`] so the handler can be run
//! against an in-memory source in tests.

use crate::core::providers::endpoint;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The reference is not a URL or carries no `v` parameter
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Transcript unavailable: {0}")]
    Unavailable(String),
}

/// One caption cue, in track order
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionFragment {
    pub text: String,
    pub start_ms: u64,
}

#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Ordered caption fragments for a video id
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError>;
}

/// Extract the video id from the `v` query parameter of a watch URL
pub fn extract_video_id(video_url: &str) -> Result<String, TranscriptError> {
    let url = Url::parse(video_url.trim())
        .map_err(|e| TranscriptError::InvalidReference(format!("{}: {}", video_url, e)))?;

    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TranscriptError::InvalidReference(format!("no video id in {}", video_url)))
}

/// Fetch the captions for `video_url` and join them with single spaces
pub async fn fetch_transcript(
    source: &dyn CaptionSource,
    video_url: &str,
) -> Result<String, TranscriptError> {
    let video_id = extract_video_id(video_url)?;
    let fragments = source.fetch_captions(&video_id).await?;

    if fragments.is_empty() {
        return Err(TranscriptError::Unavailable(format!(
            "no captions for video {}",
            video_id
        )));
    }

    let span_ms = fragments.last().map(|f| f.start_ms).unwrap_or(0);
    debug!(
        "Fetched {} caption fragments for {} ({} ms of track)",
        fragments.len(),
        video_id,
        span_ms
    );

    Ok(fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

/// `json3` timed-text document
#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Caption source backed by YouTube's timed-text endpoint
pub struct YouTubeCaptions {
    client: Client,
    base_url: String,
    lang: String,
}

impl YouTubeCaptions {
    pub fn new(base_url: String, lang: String, timeout: u64) -> Result<Self, TranscriptError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| TranscriptError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            lang,
        })
    }

    fn parse_timed_text(body: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
        // An empty body means the video has no track in the requested language.
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: TimedText = serde_json::from_str(body)
            .map_err(|e| TranscriptError::Unavailable(format!("Malformed caption track: {}", e)))?;

        Ok(document
            .events
            .into_iter()
            .filter_map(|event| {
                let text = event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<String>()
                    .replace('\n', " ")
                    .trim()
                    .to_string();
                (!text.is_empty()).then_some(CaptionFragment {
                    text,
                    start_ms: event.t_start_ms,
                })
            })
            .collect())
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptions {
    async fn fetch_captions(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "api/timedtext"))
            .query(&[("v", video_id), ("lang", self.lang.as_str()), ("fmt", "json3")])
            .send()
            .await
            .map_err(|e| TranscriptError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptError::Unavailable(format!(
                "caption request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptError::Unavailable(e.to_string()))?;

        Self::parse_timed_text(&body)
    }
}
