//! Language identification of the question.

use crate::llm::{ChatBackend, ChatMessage};
use crate::otel::{llm_span, LlmStep};
use crate::types::Result;
use std::sync::Arc;
use tracing::Instrument;

/// Role message for the detector.
pub const DETECTOR_ROLE: &str = "You are a language detector";

/// Instruction placed before the question text.
pub const DETECTION_INSTRUCTIONS: &str =
    "What language is this? Respond with only the language name, like 'English' or 'Kiswahili':";

/// Names the language a question is written in.
///
/// Whatever the model answers is lower-cased and returned. There is no list
/// of known languages; an odd reply flows on to the explanation step as-is.
pub struct LanguageDetector {
    backend: Arc<dyn ChatBackend>,
}

impl LanguageDetector {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Messages for one detection request.
    pub fn messages(question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::user(DETECTOR_ROLE),
            ChatMessage::user(format!("{}\n\n{}", DETECTION_INSTRUCTIONS, question)),
        ]
    }

    /// Detect the language of a question.
    ///
    /// # Returns
    ///
    /// Lower-cased language name (e.g., "english", "kiswahili")
    ///
    /// # Errors
    ///
    /// Returns `NlqError::LlmError` if the completion request fails
    pub async fn detect(&self, question: &str) -> Result<String> {
        let span = llm_span(LlmStep::DetectLanguage, self.backend.model());
        let reply = self.backend.complete(&Self::messages(question)).instrument(span).await?;
        let language = reply.to_lowercase();

        tracing::debug!(language = %language, "Detected language");
        Ok(language)
    }
}
