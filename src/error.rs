//! Error types for the ats-resume-expert library.
//!
//! Every user action (review, skill gap, match) either produces an
//! [`crate::output::Assessment`] or fails with exactly one [`AtsError`].
//! The three failures the presentation layer cares most about are:
//!
//! * [`AtsError::MissingInput`] — no resume was supplied.
//! * [`AtsError::NoExtractableText`] — a resume was supplied but no page
//!   carried selectable text (typically a scanned document).
//! * [`AtsError::RequestFailed`] — the generative text service call failed
//!   for any reason (network, auth, quota, malformed response).
//!
//! An unparseable match percentage is *not* an error: the request succeeded,
//! so it is reported as `MatchResult { score: None, .. }` instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ats-resume-expert library.
#[derive(Debug, Error)]
pub enum AtsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No resume document was supplied (or it was empty).
    #[error("No resume document supplied.\nPass a PDF path or URL.")]
    MissingInput,

    /// Input file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The document was read, but is not a PDF.
    #[error("Document '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// Reading the uploaded stream failed.
    #[error("Failed to read resume '{name}': {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Every scanned page yielded empty or whitespace-only text.
    #[error(
        "No text could be extracted from the PDF. \
This might be a scanned document without selectable text."
    )]
    NoExtractableText,

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// The document backend could not produce text for a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium system-wide, or set PDFIUM_LIB_PATH to the directory\n\
containing libpdfium (pdfium.dll on Windows)."
    )]
    PdfiumBindingFailed(String),

    // ── Generative service errors ─────────────────────────────────────────
    /// No generator could be built (missing API key, unknown provider).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The generative text service call failed. Never retried.
    #[error("Request to '{provider}' failed: {detail}")]
    RequestFailed { provider: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtsError {
    /// `true` for the errors that mean "the user gave us nothing usable",
    /// as opposed to a failure further down the pipeline.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, AtsError::MissingInput)
    }
}
