//! Constants shared across the router
//!
//! This module defines message roles, provider wire constants, output
//! token bounds, and the fixed texts returned to the browser client.

/// Message role constants
pub mod role {
    /// User role identifier
    pub const USER: &str = "user";

    /// System role identifier
    pub const SYSTEM: &str = "system";
}

/// Maximum output tokens per call site
pub mod tokens {
    /// Plain prompts, care groups and grants
    pub const SHORT_ANSWER: u32 = 150;

    /// Researcher list lookup
    pub const RESEARCHER_LIST: u32 = 500;

    /// Research answers and webinar analysis
    pub const LONG_ANSWER: u32 = 1000;
}

/// Anthropic Messages API constants
pub mod anthropic {
    /// Required `anthropic-version` header value
    pub const API_VERSION: &str = "2023-06-01";

    /// Content block type carrying text
    pub const TEXT_BLOCK: &str = "text";
}

/// Fixed texts placed in the response map or error bodies
pub mod text {
    /// Answer for a use-case tag the router does not know
    pub const INVALID_USE_CASE: &str = "Invalid use case";

    /// Answer when a webinar transcript cannot be retrieved
    pub const WEBINAR_UNAVAILABLE: &str = "Error: Unable to analyze the webinar";

    /// 400 body for `/api/compare`
    pub const PROMPT_OR_VIDEO_REQUIRED: &str = "Prompt or video URL is required";

    /// 400 body for the single-provider endpoint
    pub const PROMPT_REQUIRED: &str = "Prompt is required";

    /// 404 body for an unrecognized provider path segment
    pub const UNKNOWN_PROVIDER: &str = "Unknown provider";

    /// 500 body for any request-level failure
    pub const FETCH_FAILED: &str = "Error fetching AI responses";
}
