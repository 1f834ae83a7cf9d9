//! PostgreSQL text-format values to JSON.

use serde_json::{Number, Value as JsonValue};
use tokio_postgres::types::Type;

/// Decode one cell returned by the simple-query protocol.
///
/// # Arguments
///
/// * `ty` - Column type from the prepared statement, if known
/// * `raw` - Text form of the value, `None` for SQL NULL
///
/// # Returns
///
/// Booleans and integers become JSON booleans and integers, floating point
/// becomes JSON numbers, json/jsonb is parsed. Numeric becomes a number only
/// when no digits are lost. Anything that does not decode cleanly, and every
/// other type, is kept as a string.
pub fn decode_text_value(ty: Option<&Type>, raw: Option<&str>) -> JsonValue {
    let Some(raw) = raw else {
        return JsonValue::Null;
    };
    let text = || JsonValue::String(raw.to_string());

    match ty {
        Some(t) if *t == Type::BOOL => match raw {
            "t" | "true" => JsonValue::Bool(true),
            "f" | "false" => JsonValue::Bool(false),
            _ => text(),
        },
        Some(t) if *t == Type::INT2 || *t == Type::INT4 || *t == Type::INT8 || *t == Type::OID => raw
            .parse::<i64>()
            .map(|n| JsonValue::Number(n.into()))
            .unwrap_or_else(|_| text()),
        Some(t) if *t == Type::FLOAT4 || *t == Type::FLOAT8 => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or_else(text),
        Some(t) if *t == Type::NUMERIC => decode_numeric(raw).unwrap_or_else(text),
        Some(t) if *t == Type::JSON || *t == Type::JSONB => {
            serde_json::from_str(raw).unwrap_or_else(|_| text())
        }
        _ => text(),
    }
}

/// Numeric text as a JSON number, or `None` if `f64` cannot hold it exactly.
fn decode_numeric(raw: &str) -> Option<JsonValue> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(JsonValue::Number(n.into()));
    }

    let value = raw.parse::<f64>().ok()?;
    let significant = if raw.contains('.') {
        raw.trim_end_matches('0').trim_end_matches('.')
    } else {
        raw
    };
    // f64 Display is the shortest text that parses back to the same value
    if value.to_string() != significant {
        return None;
    }

    Number::from_f64(value).map(JsonValue::Number)
}
