//! PostgreSQL executor with a connection per call.

use crate::config::PostgresConfig;
use crate::otel::{db_query_span, record_db_metrics};
use crate::query::{decode_text_value, SqlRunner};
use crate::types::{NlqError, ResultSet, Result};
use async_trait::async_trait;
use std::time::Instant;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage, Transaction};
use tracing::Instrument;

/// Executes generated SQL against the configured PostgreSQL database.
///
/// No pooling: every call connects, runs the statement, reads all rows and
/// disconnects. No timeout is set, so an unresponsive server blocks the call.
pub struct PostgresExecutor {
    config: PostgresConfig,
}

impl PostgresExecutor {
    pub fn new(config: PostgresConfig) -> Self {
        Self { config }
    }

    /// Run model-generated SQL.
    ///
    /// This is the only path by which synthesized SQL reaches the database.
    /// The text is executed verbatim: no parameterization, no statement
    /// allow-list, no row limit. Whatever the model wrote runs with the
    /// configured user's privileges, inside a transaction that is never
    /// committed, so changes it makes are rolled back when the call ends.
    /// Any validation of generated SQL belongs here.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::Postgres` for connection failures and for any error
    /// the server reports (syntax errors, unknown columns, permissions, more
    /// than one statement). Returns `NlqError::QueryError` ("no results to
    /// fetch") for a statement that produces no result columns
    pub async fn run_generated_sql(&self, sql: &str) -> Result<ResultSet> {
        let span = db_query_span(
            sql,
            &self.config.database,
            Some((self.config.host.as_str(), self.config.port)),
        );

        async {
            let started = Instant::now();
            let result = self.with_connection(sql).await?;

            record_db_metrics(result.len());
            tracing::info!(
                rows = result.len(),
                columns = result.columns.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Query executed"
            );
            Ok::<_, NlqError>(result)
        }
        .instrument(span)
        .await
    }

    /// Connect, fetch, then close the connection whatever the outcome.
    async fn with_connection(&self, sql: &str) -> Result<ResultSet> {
        let (mut client, connection) = self.config.to_pg_config().connect(NoTls).await?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        let result = fetch_all(&mut client, sql).await;

        // Dropping the client ends the connection future.
        drop(client);
        if let Err(e) = driver.await {
            tracing::warn!(error = %e, "PostgreSQL connection task failed");
        }

        result
    }
}

#[async_trait]
impl SqlRunner for PostgresExecutor {
    async fn run(&self, sql: &str) -> Result<ResultSet> {
        self.run_generated_sql(sql).await
    }
}

/// Run the statement in a transaction that is always rolled back.
async fn fetch_all(client: &mut Client, sql: &str) -> Result<ResultSet> {
    let transaction = client.transaction().await?;
    let result = fetch_rows(&transaction, sql).await;

    if let Err(e) = transaction.rollback().await {
        tracing::warn!(error = %e, "Rollback of generated SQL failed");
    }

    result
}

/// Describe the statement for column names and types, then execute it with
/// the simple-query protocol and decode every text cell.
async fn fetch_rows(transaction: &Transaction<'_>, sql: &str) -> Result<ResultSet> {
    let statement = transaction.prepare(sql).await?;
    if statement.columns().is_empty() {
        return Err(NlqError::query("no results to fetch"));
    }

    let columns: Vec<String> = statement.columns().iter().map(|c| c.name().to_string()).collect();
    let types: Vec<_> = statement.columns().iter().map(|c| c.type_().clone()).collect();

    let mut rows = Vec::new();
    for message in transaction.simple_query(sql).await? {
        if let SimpleQueryMessage::Row(row) = message {
            let values: Vec<_> = (0..row.len())
                .map(|i| decode_text_value(types.get(i), row.get(i)))
                .collect();
            rows.push(values);
        }
    }

    Ok(ResultSet::new(columns, rows))
}
