//! Chat-model powered query synthesis, language detection and explanation.
//!
//! Each component owns its fixed instruction text and makes exactly one
//! completion request per call through a [`ChatBackend`].

pub mod openai;
pub mod synthesizer;
pub mod detector;
pub mod explainer;

pub use openai::OpenAiClient;
pub use synthesizer::QuerySynthesizer;
pub use detector::LanguageDetector;
pub use explainer::ExplanationGenerator;

use crate::types::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Chat completion endpoint.
///
/// Takes an ordered list of messages and returns the single completion text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Request one completion.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::LlmError` for any transport, auth, rate-limit or
    /// response-format failure
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model name, for logging and spans.
    fn model(&self) -> &str;
}
