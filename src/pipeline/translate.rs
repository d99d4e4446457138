//! Translation: one chat-completion call per page.
//!
//! Two seams keep this testable without a network:
//!
//! * [`PageTranslator`]: "given text, return its translation". The pipeline
//!   only ever talks to this trait.
//! * [`ChatTransport`]: the HTTP POST underneath [`ChatTranslator`]. The
//!   production [`ReqwestTransport`] owns a single `reqwest::Client` built
//!   once per run; tests substitute a stub that counts calls or returns
//!   canned responses.
//!
//! The response body is decoded into typed structs so a missing
//! `choices[0].message.content` surfaces as a `TranslationService` error
//! rather than a panic on a dynamic lookup.

use crate::config::ConversionConfig;
use crate::error::Pdf2VideoError;
use crate::prompts;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Translate one block of text.
#[async_trait]
pub trait PageTranslator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, Pdf2VideoError>;
}

/// Raw HTTP answer: status code plus body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Bearer-authenticated JSON POST.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &ChatCompletionRequest,
    ) -> Result<TransportResponse, Pdf2VideoError>;
}

/// [`ChatTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: &ChatCompletionRequest,
    ) -> Result<TransportResponse, Pdf2VideoError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .json(body)
            .send()
            .await
            .map_err(|e| Pdf2VideoError::translation(format!("request to {url} failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Pdf2VideoError::translation(format!("reading response body: {e}")))?;

        Ok(TransportResponse { status, body })
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

/// One message in the chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
pub fn parse_completion(body: &str) -> Result<String, Pdf2VideoError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| Pdf2VideoError::translation(format!("malformed response body: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Pdf2VideoError::translation("response has no choices"))?
        .message
        .content
        .ok_or_else(|| Pdf2VideoError::translation("first choice has no message content"))
}

// ── Credential ───────────────────────────────────────────────────────────

/// Resolve the API key: the explicit config value, else the environment.
///
/// Empty values count as absent.
pub fn resolve_credential(config: &ConversionConfig) -> Result<String, Pdf2VideoError> {
    let key = config
        .api_key
        .clone()
        .or_else(|| std::env::var(&config.api_key_env).ok())
        .filter(|k| !k.trim().is_empty());

    key.ok_or_else(|| Pdf2VideoError::MissingCredential {
        var: config.api_key_env.clone(),
    })
}

// ── Translator ───────────────────────────────────────────────────────────

/// The built-in translator: an OpenAI-compatible chat-completion client.
pub struct ChatTranslator {
    transport: Arc<dyn ChatTransport>,
    api_key: String,
    url: String,
    model: String,
    system_prompt: String,
}

impl std::fmt::Debug for ChatTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatTranslator")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .finish_non_exhaustive()
    }
}

impl ChatTranslator {
    /// Build a translator, reading the credential once.
    ///
    /// Fails with [`Pdf2VideoError::MissingCredential`] before the transport
    /// is ever used.
    pub fn from_config(
        config: &ConversionConfig,
        transport: Arc<dyn ChatTransport>,
    ) -> Result<Self, Pdf2VideoError> {
        let api_key = resolve_credential(config)?;
        Ok(Self {
            transport,
            api_key,
            url: config.completions_url(),
            model: config.model.clone(),
            system_prompt: prompts::system_prompt(config),
        })
    }

    /// The request body sent for `text`.
    pub fn build_request(&self, text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(text),
            ],
        }
    }
}

#[async_trait]
impl PageTranslator for ChatTranslator {
    async fn translate(&self, text: &str) -> Result<String, Pdf2VideoError> {
        let request = self.build_request(text);
        let response = self
            .transport
            .post_json(&self.url, &self.api_key, &request)
            .await?;

        if !response.is_success() {
            return Err(Pdf2VideoError::TranslationService {
                page: None,
                status: Some(response.status),
                detail: format!("HTTP {}: {}", response.status, response.body.trim()),
            });
        }

        let translated = parse_completion(&response.body)?;
        debug!(
            "Translated {} chars → {} chars",
            text.chars().count(),
            translated.chars().count()
        );
        Ok(translated)
    }
}
