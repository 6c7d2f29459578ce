//! The generative text service.
//!
//! [`TextGenerator`] is the seam between the pipeline and whatever model
//! answers the request. Two implementations ship with the crate:
//!
//! * [`GeminiClient`] — Google's `generateContent` REST endpoint, the
//!   default. The credential is handed in explicitly; nothing here reads
//!   the environment.
//! * [`EdgequakeGenerator`] — any `edgequake_llm` provider (OpenAI,
//!   Anthropic, Ollama, ...), created through `ProviderFactory`.
//!
//! Exactly one call is made per request. Failures of any kind come back as
//! [`AtsError::RequestFailed`] and are never retried.

use crate::config::{AssessmentConfig, DEFAULT_MODEL};
use crate::error::AtsError;
use crate::output::{ModelRequest, ModelResponse};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default root of the Gemini REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// A service that turns an ordered list of text segments into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name, used in error messages and logs.
    fn name(&self) -> &str;

    /// Model identifier the request is sent to.
    fn model(&self) -> &str;

    /// Submit one request and return the model's text verbatim.
    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, AtsError>;
}

// ── Gemini ───────────────────────────────────────────────────────────────

/// Client for Gemini `models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Client for `model` with default settings.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AtsError> {
        Self::build(
            api_key.into(),
            model.into(),
            GEMINI_API_BASE.to_string(),
            None,
            GenerationConfig::default(),
        )
    }

    /// Client from an assessment config. Requires `config.api_key`.
    pub fn from_config(config: &AssessmentConfig) -> Result<Self, AtsError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AtsError::ProviderNotConfigured {
                provider: "gemini".to_string(),
                hint: "No API key supplied. Set GOOGLE_API_KEY (or pass --api-key).".to_string(),
            })?;
        Self::build(
            api_key,
            config.gemini_model().to_string(),
            config
                .api_base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            config.api_timeout_secs,
            GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        )
    }

    fn build(
        api_key: String,
        model: String,
        base_url: String,
        timeout_secs: Option<u64>,
        generation: GenerationConfig,
    ) -> Result<Self, AtsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| AtsError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            generation,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn failed(&self, detail: impl Into<String>) -> AtsError {
        AtsError::RequestFailed {
            provider: "gemini".to_string(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, AtsError> {
        let body = build_body(request, self.generation);
        debug!("POST {} ({} segments)", self.endpoint(), body.contents[0].parts.len());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.failed(format!("timed out: {e}"))
                } else {
                    self.failed(e.to_string())
                }
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| self.failed(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(self.failed(api_error_detail(status.as_u16(), &raw)));
        }

        parse_response(&raw).map_err(|detail| self.failed(detail))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "GenerationConfig::is_empty")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}

/// One user turn whose parts are the request segments, in order.
fn build_body(request: &ModelRequest, generation: GenerationConfig) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: request
                .segments()
                .into_iter()
                .map(|text| Part { text })
                .collect(),
        }],
        generation_config: generation,
    }
}

/// Text of the first candidate, all parts concatenated.
fn parse_response(raw: &str) -> Result<ModelResponse, String> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|e| format!("malformed response: {e}"))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({r})"))
            .unwrap_or_else(|| "response contained no candidates".to_string());
        return Err(reason);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(format!(
            "response contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ));
    }

    let (prompt_tokens, completion_tokens) = parsed
        .usage_metadata
        .map(|u| (u.prompt_token_count, u.candidates_token_count))
        .unwrap_or((0, 0));

    Ok(ModelResponse {
        text,
        prompt_tokens,
        completion_tokens,
    })
}

/// Human-readable detail for a non-2xx response.
fn api_error_detail(status: u16, raw: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(raw) {
        Ok(env) => match env.error.status {
            Some(s) => format!("HTTP {status} {s}: {}", env.error.message),
            None => format!("HTTP {status}: {}", env.error.message),
        },
        Err(_) => {
            let snippet: String = raw.chars().take(200).collect();
            format!("HTTP {status}: {}", snippet.trim())
        }
    }
}

// ── edgequake-llm ────────────────────────────────────────────────────────

/// Adapter over any `edgequake_llm` provider.
///
/// The segments are sent as a single user message separated by blank lines.
pub struct EdgequakeGenerator {
    provider: Arc<dyn LLMProvider>,
    name: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    timeout: Option<Duration>,
}

impl EdgequakeGenerator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        name: impl Into<String>,
        model: impl Into<String>,
        config: &AssessmentConfig,
    ) -> Self {
        Self {
            provider,
            name: name.into(),
            model: model.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.api_timeout_secs.map(Duration::from_secs),
        }
    }

    fn failed(&self, detail: impl Into<String>) -> AtsError {
        AtsError::RequestFailed {
            provider: self.name.clone(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for EdgequakeGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse, AtsError> {
        let messages = vec![ChatMessage::user(request.segments().join("\n\n"))];
        let options = CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        let call = self.provider.chat(&messages, Some(&options));
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| self.failed(format!("timed out after {}s", limit.as_secs())))?,
            None => call.await,
        };

        let response = result.map_err(|e| self.failed(e.to_string()))?;
        Ok(ModelResponse {
            text: response.content,
            prompt_tokens: response.prompt_tokens as usize,
            completion_tokens: response.completion_tokens as usize,
        })
    }
}

// ── Resolution ───────────────────────────────────────────────────────────

/// Default model for providers we know, when none is configured.
fn default_model_for(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some(DEFAULT_MODEL),
        "openai" => Some("gpt-4.1-nano"),
        "anthropic" => Some("claude-sonnet-4-20250514"),
        _ => None,
    }
}

/// Pick the generator for a run, most specific first:
///
/// 1. `config.generator`, used as-is.
/// 2. `config.provider_name` other than gemini, built by
///    [`ProviderFactory::create_llm_provider`] (which resolves that
///    provider's own key).
/// 3. Gemini with the injected `config.api_key`.
pub fn resolve_generator(config: &AssessmentConfig) -> Result<Arc<dyn TextGenerator>, AtsError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    let provider = config
        .provider_name
        .as_deref()
        .map(|p| p.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "gemini".to_string());

    if provider == "gemini" {
        let client = GeminiClient::from_config(config)?;
        info!("Using gemini / {}", client.model());
        return Ok(Arc::new(client));
    }

    let model = config
        .model
        .as_deref()
        .or_else(|| default_model_for(&provider))
        .ok_or_else(|| AtsError::ProviderNotConfigured {
            provider: provider.clone(),
            hint: "No default model for this provider; pass --model.".to_string(),
        })?;

    let llm = ProviderFactory::create_llm_provider(&provider, model).map_err(|e| {
        AtsError::ProviderNotConfigured {
            provider: provider.clone(),
            hint: format!("{e}"),
        }
    })?;

    info!("Using {} / {}", provider, model);
    Ok(Arc::new(EdgequakeGenerator::new(llm, provider, model, config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            instruction: "Rate this".into(),
            job_description: "Job Description:\nRust".into(),
            resume: "Candidate Resume (extracted from PDF):\n--- Page 1 ---\nJane".into(),
        }
    }

    #[test]
    fn body_keeps_segment_order_in_one_user_turn() {
        let req = request();
        let body = serde_json::to_value(build_body(&req, GenerationConfig::default())).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "Rate this");
        assert_eq!(parts[1]["text"], "Job Description:\nRust");
        assert!(parts[2]["text"].as_str().unwrap().starts_with("Candidate Resume"));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn body_includes_generation_config_when_set() {
        let req = request();
        let generation = GenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(2048),
        };
        let body = serde_json::to_value(build_body(&req, generation)).unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert!(body["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn parses_first_candidate_text_and_usage() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "78%\n\n"}, {"text": "Solid match."}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 812, "candidatesTokenCount": 95, "totalTokenCount": 907}
        }"#;
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.text, "78%\n\nSolid match.");
        assert_eq!(resp.prompt_tokens, 812);
        assert_eq!(resp.completion_tokens, 95);
    }

    #[test]
    fn blocked_prompt_is_reported() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_response(raw).unwrap_err();
        assert!(err.contains("SAFETY"), "got: {err}");
    }

    #[test]
    fn candidate_without_text_is_an_error() {
        let raw = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let err = parse_response(raw).unwrap_err();
        assert!(err.contains("MAX_TOKENS"), "got: {err}");
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(parse_response("<html>oops</html>")
            .unwrap_err()
            .starts_with("malformed response"));
    }

    #[test]
    fn api_error_detail_uses_error_envelope() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            api_error_detail(400, raw),
            "HTTP 400 INVALID_ARGUMENT: API key not valid."
        );
        assert_eq!(api_error_detail(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let config = AssessmentConfig::builder()
            .api_key("k")
            .api_base_url("http://localhost:8080/")
            .model("gemini-1.5-flash")
            .build()
            .unwrap();
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn gemini_without_key_is_not_configured() {
        let err = match resolve_generator(&AssessmentConfig::default()) {
            Ok(g) => panic!("expected an error, got generator {}", g.name()),
            Err(e) => e,
        };
        match err {
            AtsError::ProviderNotConfigured { provider, hint } => {
                assert_eq!(provider, "gemini");
                assert!(hint.contains("GOOGLE_API_KEY"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn gemini_is_default_provider() {
        let config = AssessmentConfig::builder().api_key("k").build().unwrap();
        let generator = resolve_generator(&config).unwrap();
        assert_eq!(generator.name(), "gemini");
        assert_eq!(generator.model(), "gemini-2.5-pro");
    }

    #[test]
    fn unknown_provider_without_model_needs_model() {
        let config = AssessmentConfig::builder()
            .provider_name("ollama")
            .build()
            .unwrap();
        assert!(matches!(
            resolve_generator(&config),
            Err(AtsError::ProviderNotConfigured { .. })
        ));
    }
}
