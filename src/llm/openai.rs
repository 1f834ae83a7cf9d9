//! OpenAI Chat Completions client.

use crate::config::ModelConfig;
use crate::llm::{ChatBackend, ChatMessage};
use crate::types::{NlqError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;

/// OpenAI API chat completion response.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

/// Chat backend for the OpenAI API (and compatible servers).
///
/// One POST per completion, no retries. The HTTP client is reused across
/// calls; nothing else is kept between requests.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    url: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a client from model configuration.
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: config.completions_url(),
            client: Client::new(),
        }
    }

    /// Request body for a chat completion.
    pub fn request_body(model: &str, messages: &[ChatMessage]) -> serde_json::Value {
        json!({
            "model": model,
            "messages": messages,
        })
    }

    /// Extract the completion text from a raw HTTP response.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::LlmError` on a non-success status, an unparseable
    /// body, no choices, or a choice without text content
    pub fn parse_response(status: StatusCode, body: &str) -> Result<String> {
        if !status.is_success() {
            return Err(NlqError::llm(format!("OpenAI API error {}: {}", status, body)));
        }

        let parsed: OpenAIResponse = serde_json::from_str(body)
            .map_err(|e| NlqError::llm(format!("Failed to parse OpenAI response: {}\nBody: {}", e, body)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| NlqError::llm("No response from OpenAI"))?
            .message
            .content
            .ok_or_else(|| NlqError::llm("OpenAI response has no text content"))
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let started = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(&self.model, messages))
            .send()
            .await
            .map_err(|e| NlqError::llm(format!("OpenAI API error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NlqError::llm(format!("Failed to read response: {}", e)))?;

        let text = Self::parse_response(status, &body)?;

        tracing::info!(
            model = %self.model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chat completion received"
        );

        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
