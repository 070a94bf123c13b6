//! Auxiliary data fetchers
//!
//! Context gathered before the main prompt is built: a video transcript for
//! webinar analysis and a researcher list for research answers.

pub mod researchers;
pub mod transcript;

pub use researchers::{ResearcherRecord, fetch_researchers};
pub use transcript::{CaptionSource, YouTubeCaptions, fetch_transcript};
