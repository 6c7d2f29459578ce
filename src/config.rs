//! Configuration for a resume assessment.
//!
//! Everything a run needs, including the service credential, lives in
//! [`AssessmentConfig`]. The library never reads the environment: the binary
//! loads the credential once at start-up and injects it here.

use crate::error::AtsError;
use crate::generator::TextGenerator;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Pages read from a resume unless configured otherwise.
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Model used when none is named.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Configuration for a resume assessment.
///
/// Built via [`AssessmentConfig::builder()`] or using
/// [`AssessmentConfig::default()`].
///
/// # Example
/// ```rust
/// use ats_resume_expert::AssessmentConfig;
///
/// let config = AssessmentConfig::builder()
///     .max_pages(3)
///     .api_key("my-key")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_pages, Some(3));
/// ```
#[derive(Clone)]
pub struct AssessmentConfig {
    /// Cap on pages read from the resume. `None` reads every page. Default: 5.
    pub max_pages: Option<usize>,

    /// Model identifier. If None, uses [`DEFAULT_MODEL`] for Gemini or
    /// the provider's default otherwise.
    pub model: Option<String>,

    /// Provider name ("gemini", "openai", "anthropic", "ollama", ...).
    /// If None, Gemini is used.
    pub provider_name: Option<String>,

    /// Pre-constructed generator. Takes precedence over `provider_name`.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Credential for the Gemini API.
    pub api_key: Option<String>,

    /// Override for the Gemini API root, e.g. a proxy.
    pub api_base_url: Option<String>,

    /// Sampling temperature. None leaves the service default.
    pub temperature: Option<f32>,

    /// Maximum output tokens. None leaves the service default.
    pub max_tokens: Option<usize>,

    /// Timeout for the model call in seconds. None waits indefinitely.
    pub api_timeout_secs: Option<u64>,

    /// PDF user password for encrypted resumes.
    pub password: Option<String>,

    /// Directory (or full path) of the pdfium shared library.
    /// If None, binds to the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            max_pages: Some(DEFAULT_MAX_PAGES),
            model: None,
            provider_name: None,
            generator: None,
            api_key: None,
            api_base_url: None,
            temperature: None,
            max_tokens: None,
            api_timeout_secs: None,
            password: None,
            pdfium_lib_path: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AssessmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentConfig")
            .field("max_pages", &self.max_pages)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn TextGenerator>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl AssessmentConfig {
    /// Create a new builder for `AssessmentConfig`.
    pub fn builder() -> AssessmentConfigBuilder {
        AssessmentConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model that will actually be requested for Gemini.
    pub fn gemini_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`AssessmentConfig`].
#[derive(Debug)]
pub struct AssessmentConfigBuilder {
    config: AssessmentConfig,
}

impl AssessmentConfigBuilder {
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n.max(1));
        self
    }

    /// Read every page of the resume.
    pub fn all_pages(mut self) -> Self {
        self.config.max_pages = None;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = Some(url.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<AssessmentConfig, AtsError> {
        // A blank key is the same as no key.
        if self
            .config
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.config.api_key = None;
        }

        let c = &self.config;
        if let Some(ref url) = c.api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AtsError::InvalidConfig(format!(
                    "API base URL must start with http:// or https://, got '{url}'"
                )));
            }
        }
        if c.max_tokens == Some(0) {
            return Err(AtsError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(AtsError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_read_five_pages_with_gemini_pro() {
        let config = AssessmentConfig::default();
        assert_eq!(config.max_pages, Some(5));
        assert_eq!(config.gemini_model(), "gemini-2.5-pro");
        assert!(config.api_timeout_secs.is_none());
    }

    #[test]
    fn max_pages_is_clamped_to_one() {
        let config = AssessmentConfig::builder().max_pages(0).build().unwrap();
        assert_eq!(config.max_pages, Some(1));
    }

    #[test]
    fn all_pages_clears_cap() {
        let config = AssessmentConfig::builder().all_pages().build().unwrap();
        assert_eq!(config.max_pages, None);
    }

    #[test]
    fn blank_api_key_becomes_none() {
        let config = AssessmentConfig::builder().api_key("   ").build().unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn bad_base_url_rejected() {
        let err = AssessmentConfig::builder()
            .api_base_url("generativelanguage.googleapis.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, AtsError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AssessmentConfig::builder()
            .api_key("super-secret")
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
