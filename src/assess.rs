//! Top-level entry points: one call per user action.
//!
//! Control flow is strictly sequential:
//!
//! ```text
//! resume ──▶ extract ──▶ request ──▶ (match only) parse score
//! ```
//!
//! No state survives between calls.

use crate::config::AssessmentConfig;
use crate::error::AtsError;
use crate::generator::{resolve_generator, TextGenerator};
use crate::output::{
    Assessment, AssessmentOutput, AssessmentStats, DocumentInfo, ExtractedText,
};
use crate::pipeline::extract::{extract_text, PageSource};
use crate::pipeline::input::{self, ResumeDocument};
use crate::pipeline::{pdf, request, score};
use crate::prompts::Action;
use std::time::Instant;
use tracing::info;

/// Assess a resume PDF (local path or URL) against a job description.
///
/// # Arguments
/// * `resume`   — path or HTTP/HTTPS URL; `None` fails with [`AtsError::MissingInput`]
/// * `job_text` — job description, may be empty
/// * `action`   — which of the three assessments to run
/// * `config`   — page cap, model, credential, ...
///
/// # Example
/// ```rust,no_run
/// use ats_resume_expert::{assess, Action, AssessmentConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AssessmentConfig::builder().api_key("...").build()?;
/// let out = assess(Some("resume.pdf"), "Senior Rust engineer", Action::Match, &config).await?;
/// match out.assessment.score() {
///     Some(pct) => println!("ATS match: {pct}%"),
///     None => println!("unparseable score:\n{}", out.assessment.response()),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn assess(
    resume: Option<&str>,
    job_text: &str,
    action: Action,
    config: &AssessmentConfig,
) -> Result<AssessmentOutput, AtsError> {
    let document = input::resolve_input(resume, config.download_timeout_secs).await?;
    assess_document(document, job_text, action, config).await
}

/// Assess a resume already held in memory.
pub async fn assess_document(
    document: ResumeDocument,
    job_text: &str,
    action: Action,
    config: &AssessmentConfig,
) -> Result<AssessmentOutput, AtsError> {
    let total_start = Instant::now();
    info!("Starting {}: {}", action, document.name);

    // ── Step 1: Extract ──────────────────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = pdf::extract_pdf(document, config).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Step 2: Request (+ parse) ────────────────────────────────────────
    finish(&extracted, job_text, action, config, total_start, extract_duration_ms).await
}

/// Assess any [`PageSource`], e.g. pages produced by another extractor.
pub async fn assess_source<S: PageSource + ?Sized>(
    source: &S,
    job_text: &str,
    action: Action,
    config: &AssessmentConfig,
) -> Result<AssessmentOutput, AtsError> {
    let total_start = Instant::now();

    let extract_start = Instant::now();
    let extracted = extract_text(source, config.max_pages)?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    finish(&extracted, job_text, action, config, total_start, extract_duration_ms).await
}

/// Run one action on already-extracted text.
///
/// For [`Action::Match`] the score is parsed from the response; an
/// unparseable score is `score: None`, not an error.
pub async fn evaluate(
    generator: &dyn TextGenerator,
    job_text: &str,
    resume: &ExtractedText,
    action: Action,
) -> Result<Assessment, AtsError> {
    let response =
        request::request_response(generator, job_text, resume.as_str(), action.instruction())
            .await?;
    Ok(into_assessment(action, response.text))
}

/// Synchronous wrapper around [`assess`].
///
/// Creates a temporary tokio runtime internally.
pub fn assess_sync(
    resume: Option<&str>,
    job_text: &str,
    action: Action,
    config: &AssessmentConfig,
) -> Result<AssessmentOutput, AtsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AtsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(assess(resume, job_text, action, config))
}

/// Page count and metadata of a resume PDF.
///
/// Does not require an API key.
pub async fn inspect(
    resume: Option<&str>,
    config: &AssessmentConfig,
) -> Result<DocumentInfo, AtsError> {
    let document = input::resolve_input(resume, config.download_timeout_secs).await?;
    pdf::inspect_document(document, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn finish(
    extracted: &ExtractedText,
    job_text: &str,
    action: Action,
    config: &AssessmentConfig,
    total_start: Instant,
    extract_duration_ms: u64,
) -> Result<AssessmentOutput, AtsError> {
    info!(
        "Extracted {} chars from {}/{} pages ({} blank)",
        extracted.char_count(),
        extracted.pages.len(),
        extracted.total_pages,
        extracted.blank_pages()
    );

    let generator = resolve_generator(config)?;

    let llm_start = Instant::now();
    let response = request::request_response(
        generator.as_ref(),
        job_text,
        extracted.as_str(),
        action.instruction(),
    )
    .await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    let stats = AssessmentStats {
        total_pages: extracted.total_pages,
        scanned_pages: extracted.scanned_pages,
        pages_with_text: extracted.pages.len(),
        resume_chars: extracted.char_count(),
        prompt_tokens: response.prompt_tokens,
        completion_tokens: response.completion_tokens,
        extract_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    let assessment = into_assessment(action, response.text);
    if let Assessment::Match(ref m) = assessment {
        match m.score {
            Some(pct) => info!("Match score: {}%", pct),
            None => info!("Match score could not be parsed from the first line"),
        }
    }
    info!("{} complete in {}ms", action, stats.total_duration_ms);

    Ok(AssessmentOutput { assessment, stats })
}

fn into_assessment(action: Action, response: String) -> Assessment {
    match action {
        Action::Analyze => Assessment::Review { response },
        Action::SkillGap => Assessment::SkillGap { response },
        Action::Match => Assessment::Match(score::to_match_result(response)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_action_parses_score() {
        let a = into_assessment(Action::Match, "64%\n\nDecent".into());
        assert_eq!(a.score(), Some(64));
    }

    #[test]
    fn review_action_never_parses() {
        let a = into_assessment(Action::Analyze, "64%".into());
        assert_eq!(a, Assessment::Review { response: "64%".into() });
    }

    #[tokio::test]
    async fn missing_resume_fails_before_anything_else() {
        let err = assess(None, "job", Action::Analyze, &AssessmentConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_missing_input());
    }
}
