//! Completion service: send a prompt, get text back.
//!
//! [`CompletionClient`] is the seam between the session and the generative
//! model. The production implementation, [`GeminiClient`], calls the Gemini
//! `generateContent` REST endpoint with `reqwest`; tests substitute a mock.
//!
//! The client is built once per session from the credential the user
//! supplied. There is no process-wide client and no credential is read
//! from the environment here.
//!
//! ## Failure policy
//!
//! One attempt per prompt. No retries, no request timeout, no rate
//! limiting: every failure is classified into a [`CompletionError`] and
//! returned to the caller, which abandons the submission.

use crate::config::AssistantConfig;
use crate::error::{AssistantError, CompletionError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Text-in, text-out generation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Return the raw completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Gemini REST client bound to one credential.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Build a client for `api_key` using the model and endpoint in `config`.
    pub fn new(api_key: SecretString, config: &AssistantConfig) -> Result<Self, AssistantError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(AssistantError::InvalidConfig("API key must not be empty".into()));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AssistantError::Internal(format!("HTTP client init failed: {e}")))?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/models/{}:generateContent", config.base_url, config.model),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Full `generateContent` URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let start = Instant::now();
        debug!("POST {} ({} prompt bytes)", self.endpoint, prompt.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| CompletionError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| CompletionError::Network {
            detail: e.to_string(),
        })?;

        let result = parse_generate_response(status, &body);
        match &result {
            Ok(text) => debug!(
                "Completion: HTTP {status}, {} bytes in {}ms",
                text.len(),
                start.elapsed().as_millis()
            ),
            Err(e) => warn!("Completion failed after {}ms: {e}", start.elapsed().as_millis()),
        }
        result
    }
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Classify an HTTP status and body from `generateContent`.
///
/// The returned text is the concatenation of every text part of the first
/// candidate.
pub fn parse_generate_response(status: u16, body: &str) -> Result<String, CompletionError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        return Err(match status {
            401 | 403 => CompletionError::Unauthorized { detail: message },
            429 => CompletionError::QuotaExceeded { detail: message },
            _ if body.contains("API_KEY_INVALID") => CompletionError::Unauthorized { detail: message },
            _ => CompletionError::Api { status, message },
        });
    }

    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::MalformedResponse {
            detail: e.to_string(),
        })?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        warn!("Prompt blocked by the service: {reason}");
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(CompletionError::EmptyResponse);
    };
    if let Some(reason) = candidate.finish_reason.as_deref() {
        debug!("finishReason: {reason}");
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(text)
}
