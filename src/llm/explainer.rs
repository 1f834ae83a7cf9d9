//! Localized explanation of a generated query.

use crate::llm::{ChatBackend, ChatMessage};
use crate::otel::{llm_span, LlmStep};
use crate::types::Result;
use std::sync::Arc;
use tracing::Instrument;

/// System message for the explainer.
pub const EXPLAINER_ROLE: &str = "You explain SQL queries naturally, in the user's language";

/// Phrase the explanation is asked to open with.
///
/// Only requested, never checked against the reply.
pub const OPENING_PHRASE: &str = "I decided to write this query because...";

/// Explains why a query was chosen, in the asker's language.
pub struct ExplanationGenerator {
    backend: Arc<dyn ChatBackend>,
}

impl ExplanationGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Prompt embedding the question, the SQL and the language directive.
    pub fn prompt(sql: &str, question: &str, language: &str) -> String {
        format!(
            r#"The user asked: "{question}"
The SQL query generated is:
{sql}

Explain to the user:
1. Why this query was chosen (the reasoning and goal)
2. Briefly describe what the query does

Respond only in {language}.
Start with: "{opening}""#,
            question = question,
            sql = sql,
            language = capitalize(language),
            opening = OPENING_PHRASE,
        )
    }

    /// Messages for one explanation request.
    pub fn messages(sql: &str, question: &str, language: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(EXPLAINER_ROLE),
            ChatMessage::user(Self::prompt(sql, question, language)),
        ]
    }

    /// Explain a query.
    ///
    /// # Arguments
    ///
    /// * `sql` - Synthesized SQL
    /// * `question` - Original question
    /// * `language` - Detected language, used verbatim in the directive
    ///
    /// # Errors
    ///
    /// Returns `NlqError::LlmError` if the completion request fails
    pub async fn explain(&self, sql: &str, question: &str, language: &str) -> Result<String> {
        let span = llm_span(LlmStep::Explain, self.backend.model());
        let reply = self
            .backend
            .complete(&Self::messages(sql, question, language))
            .instrument(span)
            .await?;

        Ok(reply.trim().to_string())
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("english"), "English");
        assert_eq!(capitalize("KISWAHILI"), "Kiswahili");
        assert_eq!(capitalize("é"), "É");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = ExplanationGenerator::prompt(
            "SELECT AVG(temperature) FROM weather_data;",
            "Wastani wa joto ni upi?",
            "kiswahili",
        );

        assert!(prompt.contains("The user asked: \"Wastani wa joto ni upi?\""));
        assert!(prompt.contains("SELECT AVG(temperature) FROM weather_data;"));
        assert!(prompt.contains("Respond only in Kiswahili."));
        assert!(prompt.contains(OPENING_PHRASE));
    }

    #[test]
    fn test_unexpected_language_passed_through() {
        let prompt = ExplanationGenerator::prompt("SELECT 1", "q", "the language is english.");
        assert!(prompt.contains("Respond only in The language is english.."));
    }
}
