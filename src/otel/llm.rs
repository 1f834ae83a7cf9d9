//! Chat model call instrumentation.

use tracing::{span, Level, Span};

/// Pipeline step issuing a model call (maps to `nlq.step`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStep {
    /// Question to SQL
    Synthesize,
    /// Question to language name
    DetectLanguage,
    /// SQL to localized explanation
    Explain,
}

impl LlmStep {
    /// Get step name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synthesize => "synthesize",
            Self::DetectLanguage => "detect_language",
            Self::Explain => "explain",
        }
    }
}

/// Create a span for one chat completion request.
///
/// # Arguments
///
/// * `step` - Pipeline step making the call
/// * `model` - Requested model name
pub fn llm_span(step: LlmStep, model: &str) -> Span {
    span!(
        Level::INFO,
        "gen_ai.chat",
        otel.name = %format!("chat {}", model),
        otel.kind = "client",
        gen_ai.system = "openai",
        gen_ai.operation.name = "chat",
        gen_ai.request.model = model,
        nlq.step = step.as_str(),
    )
}
