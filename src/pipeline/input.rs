//! Input resolution: turn whatever the user handed us into resume bytes.
//!
//! A resume may be a local path, an HTTP/HTTPS URL, an open reader, or bytes
//! already in memory. Everything ends up as a [`ResumeDocument`] owned for the
//! duration of one action. The PDF magic bytes (`%PDF`) are checked here so
//! callers get a meaningful error rather than a pdfium failure.

use crate::error::AtsError;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An uploaded resume: a name for messages plus the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ResumeDocument {
    /// Wrap bytes already in memory. Empty bytes count as no document.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AtsError> {
        if bytes.is_empty() {
            return Err(AtsError::MissingInput);
        }
        Ok(Self {
            name: name.into(),
            bytes,
        })
    }

    /// Read a whole stream, rewinding it to the start first.
    pub fn from_reader<R: Read + Seek>(
        name: impl Into<String>,
        mut reader: R,
    ) -> Result<Self, AtsError> {
        let name = name.into();
        let mut bytes = Vec::new();
        reader
            .seek(SeekFrom::Start(0))
            .and_then(|_| reader.read_to_end(&mut bytes))
            .map_err(|source| AtsError::ReadFailed {
                name: name.clone(),
                source,
            })?;
        Self::from_bytes(name, bytes)
    }

    /// Fail with [`AtsError::NotAPdf`] unless the bytes start with `%PDF`.
    pub fn ensure_pdf(&self) -> Result<(), AtsError> {
        if self.bytes.len() >= 4 && &self.bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&self.bytes[..4]);
            return Err(AtsError::NotAPdf {
                name: self.name.clone(),
                magic,
            });
        }
        Ok(())
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve an optional path or URL to resume bytes.
///
/// `None` or a blank string is [`AtsError::MissingInput`].
pub async fn resolve_input(
    input: Option<&str>,
    timeout_secs: u64,
) -> Result<ResumeDocument, AtsError> {
    let input = match input.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(AtsError::MissingInput),
    };

    let document = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    document.ensure_pdf()?;
    Ok(document)
}

/// Read a local file, distinguishing missing files from permission errors.
async fn read_local(path_str: &str) -> Result<ResumeDocument, AtsError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => AtsError::PermissionDenied { path: path.clone() },
        std::io::ErrorKind::NotFound => AtsError::FileNotFound { path: path.clone() },
        _ => AtsError::ReadFailed {
            name: path.display().to_string(),
            source: e,
        },
    })?;

    debug!("Read local resume: {} ({} bytes)", path.display(), bytes.len());
    ResumeDocument::from_bytes(display_name(&path), bytes)
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResumeDocument, AtsError> {
    info!("Downloading resume from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AtsError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AtsError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AtsError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AtsError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AtsError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    ResumeDocument::from_bytes(extract_filename(url), bytes.to_vec())
}

/// File name for messages, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract a reasonable filename from the URL.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "resume.pdf".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/cv.pdf"));
        assert!(is_url("http://example.com/cv.pdf"));
        assert!(!is_url("/tmp/cv.pdf"));
        assert!(!is_url("cv.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename("https://host/files/jane_doe.pdf"), "jane_doe.pdf");
        assert_eq!(extract_filename("https://host/download"), "resume.pdf");
    }

    #[tokio::test]
    async fn none_or_blank_is_missing_input() {
        assert!(matches!(resolve_input(None, 5).await, Err(AtsError::MissingInput)));
        assert!(matches!(
            resolve_input(Some("   "), 5).await,
            Err(AtsError::MissingInput)
        ));
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let err = resolve_input(Some("/definitely/not/here/cv.pdf"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn non_pdf_file_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"Jane Doe, plain text resume").unwrap();
        let path = tmp.path().to_string_lossy().to_string();

        let err = resolve_input(Some(&path), 5).await.unwrap_err();
        match err {
            AtsError::NotAPdf { magic, .. } => assert_eq!(&magic, b"Jane"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_file_is_missing_input() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let path = tmp.path().to_string_lossy().to_string();
        assert!(matches!(
            resolve_input(Some(&path), 5).await,
            Err(AtsError::MissingInput)
        ));
    }

    #[tokio::test]
    async fn pdf_file_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%fake body").unwrap();
        let path = tmp.path().to_string_lossy().to_string();

        let doc = resolve_input(Some(&path), 5).await.unwrap();
        assert!(doc.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn reader_is_rewound_before_reading() {
        let mut cursor = Cursor::new(b"%PDF-1.4 body".to_vec());
        cursor.set_position(6);
        let doc = ResumeDocument::from_reader("upload.pdf", cursor).unwrap();
        assert_eq!(doc.bytes, b"%PDF-1.4 body");
    }

    #[test]
    fn empty_bytes_are_missing_input() {
        assert!(matches!(
            ResumeDocument::from_bytes("x.pdf", Vec::new()),
            Err(AtsError::MissingInput)
        ));
    }
}
