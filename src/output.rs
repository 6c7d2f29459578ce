//! Data produced along the pipeline: extracted text, the model request and
//! response, and the final assessment handed to the presentation layer.
//!
//! Every value here is created per user action and dropped once rendered.

use crate::prompts::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text of one page that yielded non-whitespace content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Page text, trimmed.
    pub text: String,
}

impl PageText {
    /// The labelled block this page contributes to the joined text.
    pub fn block(&self) -> String {
        format!("--- Page {} ---\n{}", self.page_num, self.text)
    }
}

/// Resume text extracted from a page-oriented document.
///
/// Never empty: extraction fails with
/// [`crate::AtsError::NoExtractableText`] instead of producing an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Pages with text, in page order.
    pub pages: Vec<PageText>,
    /// Pages actually read (at most the configured cap).
    pub scanned_pages: usize,
    /// Pages in the document.
    pub total_pages: usize,
    text: String,
}

impl ExtractedText {
    pub(crate) fn new(pages: Vec<PageText>, scanned_pages: usize, total_pages: usize) -> Self {
        let text = pages
            .iter()
            .map(PageText::block)
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string();
        Self {
            pages,
            scanned_pages,
            total_pages,
            text,
        }
    }

    /// The joined, page-labelled text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Pages that were read but contributed no text.
    pub fn blank_pages(&self) -> usize {
        self.scanned_pages.saturating_sub(self.pages.len())
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The three ordered text segments sent in one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub instruction: String,
    pub job_description: String,
    pub resume: String,
}

impl ModelRequest {
    /// Segments in the order the service receives them.
    pub fn segments(&self) -> [&str; 3] {
        [&self.instruction, &self.job_description, &self.resume]
    }
}

/// Raw text returned by the model, plus token accounting when the service
/// reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

impl ModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Outcome of the match action.
///
/// `score` is `None` when the first response line could not be read as a
/// percentage in 0–100. The raw response is always kept so it can be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: Option<u8>,
    pub response: String,
}

impl MatchResult {
    pub fn is_parsed(&self) -> bool {
        self.score.is_some()
    }
}

/// Result of one user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Assessment {
    Review { response: String },
    SkillGap { response: String },
    Match(MatchResult),
}

impl Assessment {
    pub fn action(&self) -> Action {
        match self {
            Assessment::Review { .. } => Action::Analyze,
            Assessment::SkillGap { .. } => Action::SkillGap,
            Assessment::Match(_) => Action::Match,
        }
    }

    /// Raw model text, available for every action.
    pub fn response(&self) -> &str {
        match self {
            Assessment::Review { response } | Assessment::SkillGap { response } => response,
            Assessment::Match(m) => &m.response,
        }
    }

    /// Parsed match percentage; `None` for other actions or when unparseable.
    pub fn score(&self) -> Option<u8> {
        match self {
            Assessment::Match(m) => m.score,
            _ => None,
        }
    }
}

/// Timing and size figures for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentStats {
    pub total_pages: usize,
    pub scanned_pages: usize,
    pub pages_with_text: usize,
    pub resume_chars: usize,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything returned by [`crate::assess`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOutput {
    pub assessment: Assessment,
    pub stats: AssessmentStats,
}

/// Basic facts about a resume PDF, available without an API key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, text: &str) -> PageText {
        PageText {
            page_num: n,
            text: text.into(),
        }
    }

    #[test]
    fn extracted_text_joins_blocks_with_blank_line() {
        let extracted = ExtractedText::new(vec![page(1, "Alice"), page(3, "Rust")], 3, 4);
        assert_eq!(
            extracted.as_str(),
            "--- Page 1 ---\nAlice\n\n--- Page 3 ---\nRust"
        );
        assert_eq!(extracted.blank_pages(), 1);
        assert_eq!(extracted.to_string(), extracted.as_str());
    }

    #[test]
    fn assessment_serialises_with_action_tag() {
        let a = Assessment::Match(MatchResult {
            score: Some(78),
            response: "78%\n\nGood fit".into(),
        });
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["action"], "match");
        assert_eq!(json["score"], 78);

        let r = Assessment::SkillGap {
            response: "Section 1".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["action"], "skill_gap");
    }

    #[test]
    fn score_only_for_match() {
        let r = Assessment::Review {
            response: "99%".into(),
        };
        assert_eq!(r.score(), None);
        assert_eq!(r.action(), Action::Analyze);
        assert_eq!(r.response(), "99%");
    }
}
