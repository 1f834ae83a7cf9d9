//! Weather NLQ - natural language questions over weather observations
//!
//! Turns an English or Kiswahili question into PostgreSQL against the
//! `weather_data` table, explains the query in the asker's language and
//! returns the rows:
//! - Query synthesis, language detection and explanation via a chat model
//! - Per-call PostgreSQL execution of the generated SQL
//! - A linear pipeline that is the single error boundary
//!
//! Used by the `weather-ask` binary; every network seam is a trait so the
//! pipeline can run against test doubles.

pub mod types;
pub mod config;
pub mod llm;
pub mod query;
pub mod otel;
pub mod pipeline;
pub mod present;

pub use config::{AppConfig, ModelConfig, PostgresConfig};
pub use llm::{ChatBackend, ChatMessage, ExplanationGenerator, LanguageDetector, OpenAiClient, QuerySynthesizer, Role};
pub use pipeline::{Answer, Failure, Outcome, Pipeline, PipelineRun, PipelineState};
pub use query::{PostgresExecutor, SqlRunner};
pub use types::{ErrorKind, NlqError, Result, ResultSet};
