//! Database query instrumentation.

use tracing::{field, span, Level, Span};

/// Create a span for one PostgreSQL query.
///
/// # Arguments
///
/// * `query_text` - SQL text as sent to the server
/// * `namespace` - Database name
/// * `server` - Host and port, when known
///
/// # Returns
///
/// Tracing span with database semantic attributes
pub fn db_query_span(query_text: &str, namespace: &str, server: Option<(&str, u16)>) -> Span {
    let span = span!(
        Level::INFO,
        "db.query",
        otel.name = %format!("query {}", namespace),
        otel.kind = "client",
        db.system.name = "postgresql",
        db.operation.name = "query",
        db.namespace = namespace,
        db.query.text = query_text,
        server.address = field::Empty,
        server.port = field::Empty,
        db.response.returned_rows = field::Empty,
    );

    if let Some((host, port)) = server {
        span.record("server.address", host);
        span.record("server.port", port);
    }

    span
}

/// Record the number of rows returned on the current span.
pub fn record_db_metrics(rows_returned: usize) {
    Span::current().record("db.response.returned_rows", rows_returned);
}
