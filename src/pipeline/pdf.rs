//! pdfium-backed resume reading.
//!
//! pdfium is a blocking C++ library, so every entry point here moves the work
//! onto `tokio::task::spawn_blocking` and hands back owned data.

use crate::config::AssessmentConfig;
use crate::error::AtsError;
use crate::output::{DocumentInfo, ExtractedText};
use crate::pipeline::extract::{extract_text, PageSource};
use crate::pipeline::input::ResumeDocument;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A loaded PDF, queried page by page.
pub struct PdfPageSource<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfPageSource<'a> {
    pub fn new(document: PdfDocument<'a>) -> Self {
        Self { document }
    }
}

impl PageSource for PdfPageSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, AtsError> {
        let page = self
            .document
            .pages()
            .get(index as u16)
            .map_err(|e| AtsError::PageTextFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;
        let text = page.text().map_err(|e| AtsError::PageTextFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        Ok(text.all())
    }
}

/// Bind pdfium from `lib_path` (a directory or the library file itself), or
/// from the system library when none is given.
pub fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, AtsError> {
    let bindings = match lib_path {
        Some(path) => {
            let library = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            };
            debug!("Binding pdfium from {}", library.display());
            Pdfium::bind_to_library(&library)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| AtsError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Map a pdfium load error to the most useful variant.
fn load_error(name: &str, password: Option<&str>, e: PdfiumError) -> AtsError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            AtsError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            AtsError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        AtsError::CorruptPdf {
            name: name.to_string(),
            detail: err_str,
        }
    }
}

/// Extract resume text from PDF bytes, honouring `config.max_pages`.
pub async fn extract_pdf(
    document: ResumeDocument,
    config: &AssessmentConfig,
) -> Result<ExtractedText, AtsError> {
    let max_pages = config.max_pages;
    let password = config.password.clone();
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        extract_pdf_blocking(&document, max_pages, password.as_deref(), lib_path)
    })
    .await
    .map_err(|e| AtsError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_pdf_blocking(
    document: &ResumeDocument,
    max_pages: Option<usize>,
    password: Option<&str>,
    lib_path: Option<PathBuf>,
) -> Result<ExtractedText, AtsError> {
    document.ensure_pdf()?;
    let pdfium = bind_pdfium(lib_path.as_deref())?;

    let pdf = pdfium
        .load_pdf_from_byte_slice(&document.bytes, password)
        .map_err(|e| load_error(&document.name, password, e))?;

    let source = PdfPageSource::new(pdf);
    info!(
        "PDF loaded: {} pages, reading up to {}",
        source.page_count(),
        max_pages.map_or_else(|| "all".to_string(), |n| n.to_string())
    );

    extract_text(&source, max_pages)
}

/// Page count and metadata, without extracting any text.
pub async fn inspect_document(
    document: ResumeDocument,
    config: &AssessmentConfig,
) -> Result<DocumentInfo, AtsError> {
    let password = config.password.clone();
    let lib_path = config.pdfium_lib_path.clone();

    tokio::task::spawn_blocking(move || {
        inspect_blocking(&document, password.as_deref(), lib_path)
    })
    .await
    .map_err(|e| AtsError::Internal(format!("Inspect task panicked: {}", e)))?
}

fn inspect_blocking(
    document: &ResumeDocument,
    password: Option<&str>,
    lib_path: Option<PathBuf>,
) -> Result<DocumentInfo, AtsError> {
    document.ensure_pdf()?;
    let pdfium = bind_pdfium(lib_path.as_deref())?;

    let pdf = pdfium
        .load_pdf_from_byte_slice(&document.bytes, password)
        .map_err(|e| load_error(&document.name, password, e))?;

    let metadata = pdf.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentInfo {
        name: document.name.clone(),
        page_count: pdf.pages().len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_errors_are_classified() {
        // PdfiumError's Debug output is what the classifier inspects.
        let e = load_error(
            "cv.pdf",
            None,
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError),
        );
        assert!(matches!(e, AtsError::PasswordRequired { .. }));

        let e = load_error(
            "cv.pdf",
            Some("nope"),
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError),
        );
        assert!(matches!(e, AtsError::WrongPassword { .. }));
    }

    #[test]
    fn other_load_errors_are_corrupt() {
        let e = load_error(
            "cv.pdf",
            None,
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError),
        );
        assert!(matches!(e, AtsError::CorruptPdf { .. }));
    }

    #[test]
    fn binding_to_missing_library_fails_cleanly() {
        let err = bind_pdfium(Some(Path::new("/definitely/not/libpdfium.so")))
            .err()
            .unwrap();
        assert!(matches!(err, AtsError::PdfiumBindingFailed(_)));
    }
}
