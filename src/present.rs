//! Terminal rendering of pipeline outcomes.
//!
//! A successful run shows the generated SQL, the explanation and the results
//! as a table (or JSON/CSV). An empty result shows an explicit notice instead
//! of an empty table. A failed run shows the generic notice, the trace and the
//! short message as three separate blocks.

use crate::pipeline::{Answer, Failure};
use crate::types::{NlqError, ResultSet, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde_json::{json, Value as JsonValue};
use tabled::settings::Style;

/// Shown in place of a table when the query matched nothing.
pub const NO_RESULTS_NOTICE: &str = "No results found.";

/// Results output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Bordered table
    #[default]
    Table,
    /// Whole answer as pretty JSON
    Json,
    /// Results as CSV
    Csv,
}

/// How a result set will be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// Zero rows: show [`NO_RESULTS_NOTICE`]
    NoResults,
    /// Rendered rows
    Rows(String),
}

/// Choose the results view and render the rows.
pub fn results_view(results: &ResultSet, format: OutputFormat) -> Result<ResultsView> {
    if results.is_empty() {
        return Ok(ResultsView::NoResults);
    }

    let rendered = match format {
        OutputFormat::Table => format_as_table(results),
        OutputFormat::Json => serde_json::to_string_pretty(&results.records())?,
        OutputFormat::Csv => format_as_csv(results)?,
    };

    Ok(ResultsView::Rows(rendered))
}

/// Render a successful run.
pub fn render_answer(answer: &Answer, format: OutputFormat, color: bool) -> Result<String> {
    if format == OutputFormat::Json {
        return render_answer_json(answer);
    }

    let mut out = String::new();
    out.push_str(&heading("Generated SQL:", color));
    out.push('\n');
    out.push_str(&answer.sql);
    out.push_str("\n\n");

    out.push_str(&heading("Why this query:", color));
    out.push('\n');
    out.push_str(&answer.explanation);
    out.push('\n');

    if let Some(results) = &answer.results {
        out.push('\n');
        out.push_str(&heading("Query results:", color));
        out.push('\n');

        match results_view(results, format)? {
            ResultsView::NoResults => out.push_str(&paint(NO_RESULTS_NOTICE, color, |s| s.yellow().to_string())),
            ResultsView::Rows(rows) => out.push_str(rows.trim_end()),
        }
        out.push('\n');
    }

    Ok(out)
}

/// Render a failed run: notice, trace and message, in that order.
///
/// A run that failed while executing also shows the SQL and explanation it
/// had already produced, above the error.
pub fn render_failure(failure: &Failure, color: bool) -> String {
    let mut out = String::new();

    if let Some(sql) = &failure.sql {
        out.push_str(&heading("Generated SQL:", color));
        out.push('\n');
        out.push_str(sql);
        out.push_str("\n\n");
    }
    if let Some(explanation) = &failure.explanation {
        out.push_str(&heading("Why this query:", color));
        out.push('\n');
        out.push_str(explanation);
        out.push_str("\n\n");
    }

    out.push_str(&format!(
        "{}\n\n{}\n{}\n\n{} {}\n",
        paint(&failure.notice, color, |s| s.red().bold().to_string()),
        heading("Trace:", color),
        paint(&failure.trace, color, |s| s.dimmed().to_string()),
        heading("Error message:", color),
        failure.message,
    ));
    out
}

fn render_answer_json(answer: &Answer) -> Result<String> {
    let results = answer.results.as_ref().map(|rs| {
        if rs.is_empty() {
            json!({
                "columns": rs.columns,
                "notice": NO_RESULTS_NOTICE,
            })
        } else {
            json!({
                "columns": rs.columns,
                "rows": rs.records(),
            })
        }
    });

    serde_json::to_string_pretty(&json!({
        "question": answer.question,
        "sql": answer.sql,
        "language": answer.language,
        "explanation": answer.explanation,
        "results": results,
    }))
    .map_err(NlqError::from)
}

fn format_as_table(results: &ResultSet) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(results.columns.iter().cloned());
    for row in &results.rows {
        builder.push_record(row.iter().map(format_value));
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    let noun = if results.len() == 1 { "row" } else { "rows" };
    format!("{table}\n({} {})", results.len(), noun)
}

fn format_as_csv(results: &ResultSet) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&results.columns)?;
    for row in &results.rows {
        wtr.write_record(row.iter().map(format_value))?;
    }

    let data = wtr.into_inner().map_err(|e| NlqError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Format a single value for display.
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn heading(text: &str, color: bool) -> String {
    paint(text, color, |s| s.cyan().bold().to_string())
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineState;

    fn nairobi() -> ResultSet {
        ResultSet::new(
            vec!["city".to_string(), "temperature".to_string()],
            vec![vec![json!("Nairobi"), json!(32.5)]],
        )
    }

    fn answer(results: Option<ResultSet>) -> Answer {
        Answer {
            question: "What is the highest temperature recorded?".to_string(),
            sql: "SELECT city, temperature FROM weather_data ORDER BY temperature DESC LIMIT 1;".to_string(),
            language: "english".to_string(),
            explanation: "I decided to write this query because...".to_string(),
            results,
        }
    }

    #[test]
    fn test_empty_results_use_notice() {
        let empty = ResultSet::new(vec!["city".to_string()], vec![]);
        assert_eq!(results_view(&empty, OutputFormat::Table).unwrap(), ResultsView::NoResults);

        let text = render_answer(&answer(Some(empty)), OutputFormat::Table, false).unwrap();
        assert!(text.contains(NO_RESULTS_NOTICE));
        assert!(!text.contains("│"));
    }

    #[test]
    fn test_table_view() {
        let ResultsView::Rows(table) = results_view(&nairobi(), OutputFormat::Table).unwrap() else {
            panic!("expected rows");
        };
        assert!(table.contains("city"));
        assert!(table.contains("Nairobi"));
        assert!(table.contains("32.5"));
        assert!(table.ends_with("(1 row)"));
    }

    #[test]
    fn test_csv_view() {
        let ResultsView::Rows(csv) = results_view(&nairobi(), OutputFormat::Csv).unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(csv, "city,temperature\nNairobi,32.5\n");
    }

    #[test]
    fn test_answer_sections_in_order() {
        let text = render_answer(&answer(Some(nairobi())), OutputFormat::Table, false).unwrap();

        let sql = text.find("Generated SQL:").unwrap();
        let why = text.find("Why this query:").unwrap();
        let results = text.find("Query results:").unwrap();
        assert!(sql < why && why < results);
    }

    #[test]
    fn test_plan_only_has_no_results_section() {
        let text = render_answer(&answer(None), OutputFormat::Table, false).unwrap();
        assert!(!text.contains("Query results:"));
    }

    #[test]
    fn test_answer_json() {
        let text = render_answer(&answer(Some(nairobi())), OutputFormat::Json, false).unwrap();
        let value: JsonValue = serde_json::from_str(&text).unwrap();

        assert_eq!(value["language"], "english");
        assert_eq!(value["results"]["rows"][0], json!({"city": "Nairobi", "temperature": 32.5}));
    }

    #[test]
    fn test_answer_json_empty_has_notice() {
        let empty = ResultSet::new(vec!["city".to_string(), "temperature".to_string()], vec![]);
        let text = render_answer(&answer(Some(empty)), OutputFormat::Json, false).unwrap();
        let value: JsonValue = serde_json::from_str(&text).unwrap();

        assert_eq!(value["results"]["notice"], NO_RESULTS_NOTICE);
        assert_eq!(value["results"]["columns"], json!(["city", "temperature"]));
        assert!(value["results"].get("rows").is_none());
    }

    #[test]
    fn test_failure_three_parts() {
        let failure = Failure::new(PipelineState::Executing, NlqError::query("relation \"weather\" does not exist"));
        let text = render_failure(&failure, false);

        let notice = text.find(crate::pipeline::GENERIC_NOTICE).unwrap();
        let trace = text.find("Error while executing").unwrap();
        let message = text.find("Error message: Query execution failed").unwrap();
        assert!(notice < trace && trace < message);
        assert!(!text.contains("Generated SQL:"));
    }

    #[test]
    fn test_failure_shows_attempted_query_first() {
        let failure = Failure::new(PipelineState::Executing, NlqError::query("syntax error at or near \"SELEC\""))
            .with_query("SELEC city FROM weather_data", "I decided to write this query because...");
        let text = render_failure(&failure, false);

        let sql = text.find("SELEC city FROM weather_data").unwrap();
        let why = text.find("Why this query:").unwrap();
        let notice = text.find(crate::pipeline::GENERIC_NOTICE).unwrap();
        let message = text.find("Error message:").unwrap();
        assert!(sql < why && why < notice && notice < message);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&JsonValue::Null), "NULL");
        assert_eq!(format_value(&json!("Kisumu")), "Kisumu");
        assert_eq!(format_value(&json!(3)), "3");
        assert_eq!(format_value(&json!(true)), "true");
    }
}
