//! Page-by-page text extraction.
//!
//! The extractor only needs a [`PageSource`]: something that knows its page
//! count up front and can hand back the text of a page by index. The pdfium
//! backend in [`super::pdf`] is one implementation; an in-memory list of
//! page strings is another.
//!
//! Output format, one block per page that carries text:
//!
//! ```text
//! --- Page 1 ---
//! <page text, trimmed>
//!
//! --- Page 3 ---
//! <page text, trimmed>
//! ```

use crate::error::AtsError;
use crate::output::{ExtractedText, PageText};
use tracing::{debug, warn};

/// A page-oriented document.
pub trait PageSource {
    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Plain text of the page at `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String, AtsError>;
}

impl<S: AsRef<str>> PageSource for [S] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<String, AtsError> {
        self.get(index)
            .map(|s| s.as_ref().to_string())
            .ok_or(AtsError::PageTextFailed {
                page: index + 1,
                detail: format!("page index out of range (document has {} pages)", self.len()),
            })
    }
}

impl<S: AsRef<str>> PageSource for Vec<S> {
    fn page_count(&self) -> usize {
        self.as_slice().page_count()
    }

    fn page_text(&self, index: usize) -> Result<String, AtsError> {
        self.as_slice().page_text(index)
    }
}

/// Extract the text of up to `max_pages` pages, in order, from the first.
///
/// Whitespace-only pages are skipped without ending the scan. Fails with
/// [`AtsError::NoExtractableText`] when nothing is left.
pub fn extract_text<S: PageSource + ?Sized>(
    source: &S,
    max_pages: Option<usize>,
) -> Result<ExtractedText, AtsError> {
    let total_pages = source.page_count();
    let scan = max_pages.map_or(total_pages, |cap| cap.min(total_pages));

    let mut pages = Vec::with_capacity(scan);
    for idx in 0..scan {
        let raw = source.page_text(idx)?;
        let text = raw.trim();
        if text.is_empty() {
            warn!("Page {}: no extractable text, skipping", idx + 1);
            continue;
        }
        debug!("Page {}: {} chars", idx + 1, text.len());
        pages.push(PageText {
            page_num: idx + 1,
            text: text.to_string(),
        });
    }

    if pages.is_empty() {
        return Err(AtsError::NoExtractableText);
    }

    Ok(ExtractedText::new(pages, scan, total_pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records which pages were read.
    struct Tracking {
        pages: Vec<&'static str>,
        read: RefCell<Vec<usize>>,
    }

    impl PageSource for Tracking {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, index: usize) -> Result<String, AtsError> {
            self.read.borrow_mut().push(index);
            Ok(self.pages[index].to_string())
        }
    }

    #[test]
    fn single_page_is_labelled() {
        let out = extract_text(&["  Jane Doe\nRust engineer  "][..], None).unwrap();
        assert_eq!(out.as_str(), "--- Page 1 ---\nJane Doe\nRust engineer");
        assert_eq!(out.total_pages, 1);
    }

    #[test]
    fn blank_pages_skipped_but_scan_continues() {
        let doc = vec!["first", "   \n\t", "", "fourth"];
        let out = extract_text(&doc, None).unwrap();
        assert_eq!(
            out.as_str(),
            "--- Page 1 ---\nfirst\n\n--- Page 4 ---\nfourth"
        );
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.scanned_pages, 4);
        assert_eq!(out.blank_pages(), 2);
    }

    #[test]
    fn all_blank_is_no_extractable_text() {
        let doc = vec![" ", "\n\n", ""];
        let err = extract_text(&doc, None).unwrap_err();
        assert!(matches!(err, AtsError::NoExtractableText));
    }

    #[test]
    fn empty_document_is_no_extractable_text() {
        let doc: Vec<String> = Vec::new();
        assert!(matches!(
            extract_text(&doc, Some(5)),
            Err(AtsError::NoExtractableText)
        ));
    }

    #[test]
    fn never_reads_past_cap() {
        let doc = Tracking {
            pages: vec!["a", "b", "c", "d", "e", "f", "g"],
            read: RefCell::new(Vec::new()),
        };
        let out = extract_text(&doc, Some(5)).unwrap();
        assert_eq!(*doc.read.borrow(), vec![0, 1, 2, 3, 4]);
        assert_eq!(out.scanned_pages, 5);
        assert_eq!(out.total_pages, 7);
        assert!(!out.as_str().contains("--- Page 6 ---"));
    }

    #[test]
    fn cap_beyond_length_reads_everything() {
        let out = extract_text(&vec!["a", "b"], Some(50)).unwrap();
        assert_eq!(out.scanned_pages, 2);
    }

    #[test]
    fn zero_cap_reads_nothing() {
        assert!(matches!(
            extract_text(&vec!["text"], Some(0)),
            Err(AtsError::NoExtractableText)
        ));
    }

    #[test]
    fn text_only_on_late_page_beyond_cap_fails() {
        let doc = vec!["", "", "late content"];
        assert!(matches!(
            extract_text(&doc, Some(2)),
            Err(AtsError::NoExtractableText)
        ));
    }

    #[test]
    fn backend_error_propagates() {
        struct Broken;
        impl PageSource for Broken {
            fn page_count(&self) -> usize {
                2
            }
            fn page_text(&self, index: usize) -> Result<String, AtsError> {
                Err(AtsError::PageTextFailed {
                    page: index + 1,
                    detail: "boom".into(),
                })
            }
        }
        let err = extract_text(&Broken, None).unwrap_err();
        assert!(matches!(err, AtsError::PageTextFailed { page: 1, .. }));
    }
}
