//! Tracing instrumentation following OpenTelemetry semantic conventions.
//!
//! Spans are plain `tracing` spans; any subscriber (the CLI installs
//! `tracing-subscriber`'s fmt layer) can consume them.
//!
//! # Model calls
//!
//! **Span naming**: `{gen_ai.operation.name} {gen_ai.request.model}`
//! - Example: `chat gpt-3.5-turbo`
//!
//! **Attributes**: `gen_ai.system`, `gen_ai.operation.name`,
//! `gen_ai.request.model`, plus `nlq.step` naming the pipeline step.
//!
//! # Database calls
//!
//! **Span naming**: `{db.operation.name} {db.namespace}`
//!
//! **Attributes**: `db.system.name` (always `"postgresql"`), `db.namespace`,
//! `db.query.text`, `server.address`, `server.port`,
//! `db.response.returned_rows` once known.
//!
//! # Example
//!
//! ```rust,ignore
//! use weather_nlq::otel::{db_query_span, record_db_metrics};
//!
//! let span = db_query_span(sql, "weather", Some(("localhost", 5432)));
//! let rows = run(sql).instrument(span.clone()).await?;
//! span.in_scope(|| record_db_metrics(rows.len()));
//! ```

pub mod db;
pub mod llm;

pub use db::{db_query_span, record_db_metrics};
pub use llm::{llm_span, LlmStep};
