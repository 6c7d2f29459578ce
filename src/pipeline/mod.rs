//! Pipeline stages for one resume assessment.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the PDF backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf / extract ──▶ request ──▶ score
//! (path/URL)  (page text)     (one call)  (match only)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path, URL or stream to bytes
//! 2. [`pdf`]     — load the PDF with pdfium inside `spawn_blocking`
//! 3. [`extract`] — concatenate labelled page text up to the page cap
//! 4. [`request`] — build the three-segment request and make the single
//!    model call; the only stage talking to the model
//! 5. [`score`]   — read the leading percentage of a match response

pub mod extract;
pub mod input;
pub mod pdf;
pub mod request;
pub mod score;
