//! # ats-resume-expert
//!
//! ATS-style assessment of a PDF resume against a job description, using a
//! generative language model (Gemini by default).
//!
//! Three actions are available:
//!
//! | Action | Result |
//! |--------|--------|
//! | [`Action::Analyze`]  | narrative review with headings |
//! | [`Action::SkillGap`] | matched skills, missing skills, roadmap |
//! | [`Action::Match`]    | a 0–100 match percentage plus the raw explanation |
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Extract  page text via pdfium, up to 5 pages by default
//!  ├─ 3. Request  instruction + job description + resume, one model call
//!  └─ 4. Score    match action only: leading "NN%" of the response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ats_resume_expert::{assess, Action, AssessmentConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The credential is injected explicitly; the library never reads it
//!     // from the environment.
//!     let key = std::env::var("GOOGLE_API_KEY")?;
//!     let config = AssessmentConfig::builder().api_key(key).build()?;
//!     let output = assess(Some("resume.pdf"), "Data engineer, Spark", Action::SkillGap, &config).await?;
//!     println!("{}", output.assessment.response());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ats-expert` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assess;
pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assess::{assess, assess_document, assess_source, assess_sync, evaluate, inspect};
pub use config::{AssessmentConfig, AssessmentConfigBuilder, DEFAULT_MAX_PAGES, DEFAULT_MODEL};
pub use error::AtsError;
pub use generator::{resolve_generator, EdgequakeGenerator, GeminiClient, TextGenerator};
pub use output::{
    Assessment, AssessmentOutput, AssessmentStats, DocumentInfo, ExtractedText, MatchResult,
    ModelRequest, ModelResponse, PageText,
};
pub use pipeline::extract::{extract_text, PageSource};
pub use pipeline::input::ResumeDocument;
pub use pipeline::request::{build_request, request_response, NO_JOB_DESCRIPTION};
pub use pipeline::score::parse_score;
pub use prompts::Action;
