//! Request composition and the single model call.
//!
//! A request is always three segments, in this order:
//!
//! 1. the instruction template for the chosen action,
//! 2. the job description, or a fixed fallback sentence when none was given,
//! 3. the resume text, behind a label.
//!
//! The prompt texts themselves live in [`crate::prompts`].

use crate::error::AtsError;
use crate::generator::TextGenerator;
use crate::output::{ModelRequest, ModelResponse};
use std::time::Instant;
use tracing::{debug, info};

/// Sent in place of an empty job description.
pub const NO_JOB_DESCRIPTION: &str =
    "No job description provided. Assume a generic technical role.";

const JOB_DESCRIPTION_LABEL: &str = "Job Description:\n";
const RESUME_LABEL: &str = "Candidate Resume (extracted from PDF):\n";

/// Job-description segment: trimmed text behind a label, or the fallback.
pub fn job_segment(job_text: &str) -> String {
    let job = job_text.trim();
    if job.is_empty() {
        NO_JOB_DESCRIPTION.to_string()
    } else {
        format!("{JOB_DESCRIPTION_LABEL}{job}")
    }
}

/// Assemble the three ordered segments.
pub fn build_request(job_text: &str, resume_text: &str, instruction: &str) -> ModelRequest {
    ModelRequest {
        instruction: instruction.to_string(),
        job_description: job_segment(job_text),
        resume: format!("{RESUME_LABEL}{resume_text}"),
    }
}

/// Compose the request and submit it once; the response text is returned
/// untouched.
///
/// An empty resume is rejected before anything goes over the network.
pub async fn request_response(
    generator: &dyn TextGenerator,
    job_text: &str,
    resume_text: &str,
    instruction: &str,
) -> Result<ModelResponse, AtsError> {
    if resume_text.trim().is_empty() {
        return Err(AtsError::MissingInput);
    }

    let request = build_request(job_text, resume_text, instruction);
    let start = Instant::now();
    info!(
        "Requesting {} / {} ({} resume chars, job description: {})",
        generator.name(),
        generator.model(),
        resume_text.len(),
        if job_text.trim().is_empty() { "none" } else { "given" }
    );

    let response = generator.generate(&request).await?;

    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        generator.name(),
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );
    Ok(response)
}
