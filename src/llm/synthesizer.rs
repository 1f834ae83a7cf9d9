//! Natural language question to PostgreSQL.

use crate::llm::{ChatBackend, ChatMessage};
use crate::otel::{llm_span, LlmStep};
use crate::types::Result;
use std::sync::Arc;
use tracing::Instrument;

/// Instruction sent ahead of every question.
pub const SQL_INSTRUCTIONS: &str = r#"You are an expert at translating natural language into SQL for PostgreSQL.

The database has a table called 'weather_data' with the following columns:
- city (VARCHAR)
- temperature (FLOAT)
- wind_speed (FLOAT)
- winddirection (FLOAT)
- weathercode (INT)
- request_timestamp (TIMESTAMP)

You must always return **only the SQL query** as plain text - no markdown, no code formatting.

Handle complex queries, like:
- Getting the city with the highest temperature
    -> SELECT city, temperature FROM weather_data WHERE temperature = (SELECT MAX(temperature) FROM weather_data);
- Getting the average temperature per city
    -> SELECT city, AVG(temperature) FROM weather_data GROUP BY city;

Avoid GROUP BY unless necessary. Always ensure the query is valid in PostgreSQL."#;

/// Translates questions into SQL against `weather_data`.
///
/// The reply is assumed to be a bare SQL statement. It is not parsed,
/// unfenced or otherwise checked here.
pub struct QuerySynthesizer {
    backend: Arc<dyn ChatBackend>,
}

impl QuerySynthesizer {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Messages for one synthesis request: instructions, then the question.
    pub fn messages(question: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(SQL_INSTRUCTIONS), ChatMessage::user(question)]
    }

    /// Generate SQL for a question.
    ///
    /// Blank questions are sent as-is.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::LlmError` if the completion request fails
    pub async fn synthesize(&self, question: &str) -> Result<String> {
        let span = llm_span(LlmStep::Synthesize, self.backend.model());
        let reply = self.backend.complete(&Self::messages(question)).instrument(span).await?;
        let sql = reply.trim().to_string();

        tracing::debug!(sql = %sql, "Synthesized SQL");
        Ok(sql)
    }
}
