//! Raw reqwest Gemini API client.
//!
//! Provides a minimal client for the Generative Language `generateContent`
//! endpoint. One free-text prompt in, one text completion out — no
//! streaming, no chat history, no tool use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────────────

/// Generative Language API base; model name and verb are appended per call.
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model when none is configured.
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from text-generation operations.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GEMINI_API_KEY not set")]
    MissingApiKey,

    #[error("format error: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, GenAiError>;

// ── Capability seam ─────────────────────────────────────────────────

/// Text-generation capability.
///
/// The estimate orchestrator depends on this seam rather than on a concrete
/// client, so tests can substitute canned responses — including malformed
/// and fenced variants — without network access.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a raw text completion for a free-text prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ── Wire format ─────────────────────────────────────────────────────

/// Wire format for the generateContent request (not public).
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Wire format for the generateContent response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl ApiResponse {
    /// Concatenate the first candidate's text parts into a single string.
    ///
    /// `None` when the response carries no candidates at all.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        Some(
            candidate
                .content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join(""),
        )
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// A minimal Gemini API client.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// Uses `DEFAULT_MODEL` when `model` is `None`.
    pub fn from_env(model: Option<&str>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| GenAiError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        })
    }

    /// Send a prompt to the generateContent endpoint.
    async fn send(&self, prompt: &str) -> Result<ApiResponse> {
        let body = ApiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!("{}/{}:generateContent", API_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ApiResponse = response.json().await?;
        Ok(api_response)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.send(prompt).await?;
        response
            .text()
            .ok_or_else(|| GenAiError::Format("response contains no candidates".to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
