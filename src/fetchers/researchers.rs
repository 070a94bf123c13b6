//! Researcher list lookup
//!
//! Asks one provider for three researchers in a topic and parses the
//! freeform answer. The parser is best effort: models do not always follow
//! the requested layout, and blocks that do not look like a researcher are
//! dropped rather than reported.

use crate::core::constants::tokens;
use crate::core::provider::Provider;
use tracing::{debug, warn};

/// Minimum non-blank lines for a block to count as a researcher
const MIN_BLOCK_LINES: usize = 4;

const RESEARCHER_SYSTEM_PROMPT: &str = "You are a research librarian. Answer only in the \
    requested line-based format, without introductions or closing remarks.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearcherRecord {
    pub name: String,
    pub position: String,
    pub contribution: String,
    pub papers: Vec<String>,
}

/// Prompt asking for exactly three researchers in `topic`
pub fn researcher_prompt(topic: &str) -> String {
    format!(
        "List exactly three prominent researchers working on {topic}.\n\
         Describe each researcher on at least 4 lines:\n\
         line 1: the researcher's name, numbered (for example \"1. Jane Doe\")\n\
         line 2: their current position\n\
         line 3: their key contribution to {topic}\n\
         line 4 and onward: one notable paper title per line\n\
         Separate researchers with a single blank line."
    )
}

/// Parse a provider's researcher list
///
/// Blocks are separated by blank lines; a block with fewer than four
/// non-blank lines is skipped. A leading ordinal such as `1. ` or `2) ` is
/// removed from the name line.
pub fn parse_researchers(text: &str) -> Vec<ResearcherRecord> {
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines().chain(std::iter::once("")) {
        let line = line.trim();
        if !line.is_empty() {
            block.push(line);
            continue;
        }
        if let Some(record) = parse_block(&block) {
            records.push(record);
        }
        block.clear();
    }

    records
}

fn parse_block(lines: &[&str]) -> Option<ResearcherRecord> {
    if lines.len() < MIN_BLOCK_LINES {
        return None;
    }

    Some(ResearcherRecord {
        name: strip_ordinal(lines[0]).to_string(),
        position: lines[1].to_string(),
        contribution: lines[2].to_string(),
        papers: lines[3..].iter().map(|line| line.to_string()).collect(),
    })
}

fn strip_ordinal(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
        Some(name) => name.trim_start(),
        None => line,
    }
}

/// Ask `provider` for researchers in `topic`
///
/// A failed call is logged and treated as an empty list.
pub async fn fetch_researchers(provider: &dyn Provider, topic: &str) -> Vec<ResearcherRecord> {
    let prompt = researcher_prompt(topic);

    match provider
        .respond(Some(RESEARCHER_SYSTEM_PROMPT), &prompt, tokens::RESEARCHER_LIST)
        .await
    {
        Ok(text) => {
            let records = parse_researchers(&text);
            debug!(
                "{} returned {} researchers for '{}'",
                provider.provider_name(),
                records.len(),
                topic
            );
            for record in &records {
                debug!(
                    "Researcher {} ({}): {}; {} papers",
                    record.name,
                    record.position,
                    record.contribution,
                    record.papers.len()
                );
            }
            records
        }
        Err(e) => {
            warn!(
                "Researcher lookup for '{}' via {} failed: {}",
                topic,
                provider.provider_name(),
                e
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::ProviderError;
    use async_trait::async_trait;

    struct CannedProvider(Result<&'static str, ()>);

    #[async_trait]
    impl Provider for CannedProvider {
        async fn respond(
            &self,
            _system: Option<&str>,
            _user: &str,
            _max_tokens: u32,
        ) -> Result<String, ProviderError> {
            self.0
                .map(String::from)
                .map_err(|_| ProviderError::Unexpected("boom".to_string()))
        }

        fn provider_name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_short_block_is_dropped() {
        let text = "1. Ada Lovelace\nProfessor, Cambridge\nGene therapy for SMA\nPaper A\nPaper B\n\n\
                    2. Grace Hopper\nLecturer";
        let records = parse_researchers(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ada Lovelace");
        assert_eq!(records[0].position, "Professor, Cambridge");
        assert_eq!(records[0].contribution, "Gene therapy for SMA");
        assert_eq!(records[0].papers, vec!["Paper A", "Paper B"]);
    }

    #[test]
    fn test_multiple_blank_lines_and_indentation() {
        let text = "\n  1. A\n  P\n  C\n  T\n\n\n\n2) B\nP2\nC2\nT2\n   \n";
        let records = parse_researchers(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].name, "B");
        assert_eq!(records[1].papers, vec!["T2"]);
    }

    #[test]
    fn test_name_without_ordinal_is_kept() {
        assert_eq!(strip_ordinal("Dr. Jane Doe"), "Dr. Jane Doe");
        assert_eq!(strip_ordinal("2024 Award Winner"), "2024 Award Winner");
        assert_eq!(strip_ordinal("12. Jane"), "Jane");
    }

    #[test]
    fn test_free_prose_yields_nothing() {
        assert!(parse_researchers("I'm sorry, I cannot help with that.").is_empty());
        assert!(parse_researchers("").is_empty());
    }

    #[test]
    fn test_prompt_mentions_topic() {
        let prompt = researcher_prompt("spinal muscular atrophy");
        assert!(prompt.contains("exactly three"));
        assert!(prompt.contains("spinal muscular atrophy"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_empty() {
        let provider = CannedProvider(Err(()));
        assert!(fetch_researchers(&provider, "x").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_parses_answer() {
        let provider = CannedProvider(Ok("1. A\nB\nC\nD"));
        let records = fetch_researchers(&provider, "x").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].papers, vec!["D"]);
    }
}
