//! Executor tests against a live PostgreSQL server.
//!
//! Run with `cargo test -- --ignored` and the `POSTGRES_*` variables set.
//! Each test that needs a table creates its own and drops it afterwards.

mod common;

use common::ScriptedModel;
use serde_json::json;
use std::sync::Arc;
use tokio_postgres::{Client, NoTls};
use uuid::Uuid;
use weather_nlq::{NlqError, Outcome, Pipeline, PipelineState, PostgresConfig, PostgresExecutor, SqlRunner};

fn config() -> PostgresConfig {
    PostgresConfig::from_env().expect("POSTGRES_* variables not set")
}

/// Separate connection for setup and checks, outside the executor.
async fn admin() -> Client {
    let (client, connection) = config().to_pg_config().connect(NoTls).await.unwrap();
    tokio::spawn(async move {
        let _ = connection.await;
    });
    client
}

/// Create a two-row observations table with a unique name.
async fn observations(client: &Client) -> String {
    let table = format!("weather_nlq_test_{}", Uuid::new_v4().simple());
    client
        .batch_execute(&format!(
            "CREATE TABLE {table} (city TEXT, temperature FLOAT);
             INSERT INTO {table} VALUES ('Nairobi', 32.5), ('Mombasa', 30.1);"
        ))
        .await
        .unwrap();
    table
}

async fn count(client: &Client, table: &str) -> i64 {
    client
        .query_one(&format!("SELECT count(*) FROM {table}"), &[])
        .await
        .unwrap()
        .get(0)
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_typed_columns_and_values() {
    let executor = PostgresExecutor::new(config());

    let rs = executor
        .run(
            "SELECT 'Nairobi'::text AS city, 32.5::float8 AS temperature, 61 AS weathercode, \
             NULL::float8 AS wind_speed, 1.50::numeric AS avg_speed, \
             TIMESTAMP '2025-03-01 12:00:00' AS request_timestamp",
        )
        .await
        .unwrap();

    assert_eq!(
        rs.columns,
        vec!["city", "temperature", "weathercode", "wind_speed", "avg_speed", "request_timestamp"]
    );
    assert_eq!(
        rs.rows,
        vec![vec![
            json!("Nairobi"),
            json!(32.5),
            json!(61),
            json!(null),
            json!(1.5),
            json!("2025-03-01 12:00:00"),
        ]]
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_zero_rows_keep_columns() {
    let executor = PostgresExecutor::new(config());

    let rs = executor.run("SELECT 'x'::text AS city, 1 AS n WHERE false").await.unwrap();
    assert!(rs.is_empty());
    assert_eq!(rs.columns, vec!["city", "n"]);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_server_error_message_is_reported() {
    let executor = PostgresExecutor::new(config());

    let err = executor.run("SELEC city FROM weather_data").await.unwrap_err();
    let NlqError::Postgres(ref source) = err else {
        panic!("expected a driver error, got {:?}", err);
    };
    assert!(source.as_db_error().is_some());
    assert!(err.to_string().contains("syntax error at or near \"SELEC\""), "{}", err);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_pipeline_failure_message_names_server_error() {
    let model = Arc::new(ScriptedModel::answering(
        "SELEC city FROM weather_data",
        "english",
        "I decided to write this query because...",
    ));
    let pipeline = Pipeline::new(model, Arc::new(PostgresExecutor::new(config())));

    let run = pipeline.run("Which city is hottest?").await;
    let Outcome::Failed(failure) = &run.outcome else {
        panic!("expected a failure");
    };
    assert_eq!(failure.stage, PipelineState::Executing);
    assert!(failure.message.contains("syntax error at or near \"SELEC\""), "{}", failure.message);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_writes_are_rolled_back() {
    let client = admin().await;
    let table = observations(&client).await;
    let executor = PostgresExecutor::new(config());

    let rs = executor
        .run(&format!("DELETE FROM {table} WHERE city = 'Mombasa' RETURNING city"))
        .await
        .unwrap();
    assert_eq!(rs.rows, vec![vec![json!("Mombasa")]]);
    assert_eq!(count(&client, &table).await, 2);

    client.batch_execute(&format!("DROP TABLE {table}")).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_statement_without_results_is_rejected() {
    let client = admin().await;
    let table = observations(&client).await;
    let executor = PostgresExecutor::new(config());

    let err = executor
        .run(&format!("DELETE FROM {table} WHERE city = 'Mombasa'"))
        .await
        .unwrap_err();
    assert!(matches!(err, NlqError::QueryError(ref m) if m == "no results to fetch"));
    assert_eq!(count(&client, &table).await, 2);

    client.batch_execute(&format!("DROP TABLE {table}")).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_multiple_statements_are_rejected() {
    let executor = PostgresExecutor::new(config());

    let err = executor.run("SELECT 1; SELECT 2;").await.unwrap_err();
    assert!(matches!(err, NlqError::Postgres(_)));
}
