//! Question pipeline: synthesize, detect language, explain, execute.
//!
//! The pipeline is strictly linear. Each step needs the output of the one
//! before it, so steps are awaited in order and never reordered:
//!
//! ```text
//! Idle -> Synthesizing -> DetectingLanguage -> Explaining -> Executing -> Presenting
//!              \                 \                  \             \
//!               +-----------------+------------------+-------------+--> Failed
//! ```
//!
//! [`Pipeline::run`] is the only error boundary. Components propagate every
//! error; the pipeline turns it into a [`Failure`] with a generic notice, a
//! diagnostic trace and the short error message.

use crate::config::AppConfig;
use crate::llm::{ChatBackend, ExplanationGenerator, LanguageDetector, OpenAiClient, QuerySynthesizer};
use crate::query::{PostgresExecutor, SqlRunner};
use crate::types::{NlqError, ResultSet, Result};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Notice shown to the user whenever a run fails.
pub const GENERIC_NOTICE: &str = "Oops! Something went wrong while processing your request.";

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Synthesizing,
    DetectingLanguage,
    Explaining,
    Executing,
    Presenting,
    Failed,
}

impl PipelineState {
    /// Get state name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Synthesizing => "synthesizing",
            Self::DetectingLanguage => "detecting_language",
            Self::Explaining => "explaining",
            Self::Executing => "executing",
            Self::Presenting => "presenting",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub sql: String,
    pub language: String,
    pub explanation: String,

    /// Query results, `None` when the run stopped before execution (plan only)
    pub results: Option<ResultSet>,
}

/// A failed run, disclosed three ways.
#[derive(Debug)]
pub struct Failure {
    /// State the pipeline was in when the error surfaced
    pub stage: PipelineState,

    /// The error exactly as the failing component returned it
    pub error: NlqError,

    /// Generic user-facing notice
    pub notice: String,

    /// Full diagnostic detail: stage, debug form and source chain
    pub trace: String,

    /// Short error message (`Display` of the error)
    pub message: String,

    /// SQL that was being executed, when the run failed at `Executing`
    pub sql: Option<String>,

    /// Explanation of that SQL, when the run failed at `Executing`
    pub explanation: Option<String>,
}

impl Failure {
    /// Build the three-tier disclosure for an error raised in `stage`.
    pub fn new(stage: PipelineState, error: NlqError) -> Self {
        let trace = render_trace(stage, &error);
        let message = error.to_string();

        Self {
            stage,
            error,
            notice: GENERIC_NOTICE.to_string(),
            trace,
            message,
            sql: None,
            explanation: None,
        }
    }

    /// Attach the query the failing step was given.
    pub fn with_query(mut self, sql: impl Into<String>, explanation: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self.explanation = Some(explanation.into());
        self
    }
}

/// Terminal result of a run.
#[derive(Debug)]
pub enum Outcome {
    Presented(Answer),
    Failed(Failure),
}

impl Outcome {
    /// `true` if the run reached `Presenting`.
    pub fn is_presented(&self) -> bool {
        matches!(self, Self::Presented(_))
    }
}

/// One invocation of the pipeline.
#[derive(Debug)]
pub struct PipelineRun {
    /// Request id, also recorded on the run's tracing span
    pub request_id: Uuid,

    /// Every state entered, in order, starting with `Idle`
    pub states: Vec<PipelineState>,

    pub outcome: Outcome,
}

impl PipelineRun {
    /// Final state (`Presenting` or `Failed`).
    pub fn state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Records state transitions for one run.
struct StateTracker {
    states: Vec<PipelineState>,
}

impl StateTracker {
    fn new() -> Self {
        Self { states: vec![PipelineState::Idle] }
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.current(), to = %next, "Pipeline transition");
        self.states.push(next);
    }

    fn current(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Sequences the three model calls and the database round-trip.
///
/// Holds no per-request state; each run is independent.
pub struct Pipeline {
    synthesizer: QuerySynthesizer,
    detector: LanguageDetector,
    explainer: ExplanationGenerator,
    runner: Arc<dyn SqlRunner>,
}

impl Pipeline {
    /// Create a pipeline over a chat backend and a SQL runner.
    pub fn new(backend: Arc<dyn ChatBackend>, runner: Arc<dyn SqlRunner>) -> Self {
        Self {
            synthesizer: QuerySynthesizer::new(Arc::clone(&backend)),
            detector: LanguageDetector::new(Arc::clone(&backend)),
            explainer: ExplanationGenerator::new(backend),
            runner,
        }
    }

    /// Create the production pipeline: OpenAI plus PostgreSQL.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(OpenAiClient::new(&config.model)),
            Arc::new(PostgresExecutor::new(config.postgres.clone())),
        )
    }

    /// Answer a question end to end.
    ///
    /// Never returns an error: failures are reported as [`Outcome::Failed`].
    pub async fn run(&self, question: &str) -> PipelineRun {
        self.drive(question, true).await
    }

    /// Produce SQL and explanation without touching the database.
    pub async fn plan(&self, question: &str) -> PipelineRun {
        self.drive(question, false).await
    }

    async fn drive(&self, question: &str, execute: bool) -> PipelineRun {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", request_id = %request_id, execute);

        async {
            let started = Instant::now();
            let mut tracker = StateTracker::new();

            let outcome = match self.compose(question, &mut tracker).await {
                Err(error) => {
                    let stage = tracker.current();
                    failed(&mut tracker, Failure::new(stage, error))
                }
                Ok(mut answer) if execute => {
                    tracker.enter(PipelineState::Executing);
                    match self.runner.run(&answer.sql).await {
                        Ok(results) => {
                            answer.results = Some(results);
                            presented(&mut tracker, answer, started)
                        }
                        Err(error) => {
                            let failure = Failure::new(PipelineState::Executing, error)
                                .with_query(answer.sql, answer.explanation);
                            failed(&mut tracker, failure)
                        }
                    }
                }
                Ok(answer) => presented(&mut tracker, answer, started),
            };

            PipelineRun {
                request_id,
                states: tracker.states,
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    /// The three model steps: SQL, language, explanation.
    async fn compose(&self, question: &str, tracker: &mut StateTracker) -> Result<Answer> {
        tracker.enter(PipelineState::Synthesizing);
        let sql = self.synthesizer.synthesize(question).await?;

        tracker.enter(PipelineState::DetectingLanguage);
        let language = self.detector.detect(question).await?;

        tracker.enter(PipelineState::Explaining);
        let explanation = self.explainer.explain(&sql, question, &language).await?;

        Ok(Answer {
            question: question.to_string(),
            sql,
            language,
            explanation,
            results: None,
        })
    }
}

fn presented(tracker: &mut StateTracker, answer: Answer, started: Instant) -> Outcome {
    tracker.enter(PipelineState::Presenting);
    tracing::info!(
        language = %answer.language,
        rows = answer.results.as_ref().map(ResultSet::len),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Question answered"
    );
    Outcome::Presented(answer)
}

fn failed(tracker: &mut StateTracker, failure: Failure) -> Outcome {
    tracker.enter(PipelineState::Failed);
    tracing::error!(
        stage = %failure.stage,
        kind = failure.error.kind().as_str(),
        error = %failure.error,
        sql = failure.sql.as_deref(),
        "Pipeline failed"
    );
    Outcome::Failed(failure)
}

/// Stage, debug form and full source chain of an error.
fn render_trace(stage: PipelineState, error: &NlqError) -> String {
    let mut trace = format!("Error while {}: {:?}", stage, error);

    let mut source = error.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\nCaused by: {}", cause));
        source = cause.source();
    }

    trace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_disclosure() {
        let failure = Failure::new(
            PipelineState::Executing,
            NlqError::query("syntax error at or near \"SELEC\""),
        );

        assert_eq!(failure.notice, GENERIC_NOTICE);
        assert_eq!(failure.message, "Query execution failed: syntax error at or near \"SELEC\"");
        assert!(failure.trace.starts_with("Error while executing: QueryError("));
        assert!(matches!(failure.error, NlqError::QueryError(_)));
        assert!(failure.sql.is_none() && failure.explanation.is_none());
    }

    #[test]
    fn test_failure_with_query() {
        let failure = Failure::new(PipelineState::Executing, NlqError::query("permission denied"))
            .with_query("SELECT * FROM weather_data;", "I decided to write this query because...");

        assert_eq!(failure.sql.as_deref(), Some("SELECT * FROM weather_data;"));
        assert_eq!(failure.explanation.as_deref(), Some("I decided to write this query because..."));
        assert_eq!(failure.message, "Query execution failed: permission denied");
    }

    #[test]
    fn test_trace_includes_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let trace = render_trace(PipelineState::Synthesizing, &NlqError::from(io));

        assert!(trace.contains("Error while synthesizing"));
        assert!(trace.contains("Caused by: reset by peer"));
    }

    #[test]
    fn test_state_names() {
        assert_eq!(PipelineState::DetectingLanguage.to_string(), "detecting_language");
        assert_eq!(PipelineState::Failed.as_str(), "failed");
    }
}
