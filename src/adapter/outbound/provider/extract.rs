//! Small helpers for pulling numbers out of provider payloads.
//!
//! Providers disagree on whether numbers are JSON numbers or strings, so
//! both are accepted everywhere.

use serde_json::Value;

use crate::error::FetchError;

/// Interpret `value` as a finite number.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Number at a JSON pointer such as `/data/0/value`.
pub fn number_at(body: &Value, pointer: &str) -> Result<f64, FetchError> {
    let field = body
        .pointer(pointer)
        .ok_or_else(|| FetchError::Parse(format!("missing field {pointer}")))?;
    as_number(field).ok_or_else(|| FetchError::Parse(format!("field {pointer} is not a number")))
}

/// Array at a JSON pointer (`""` for the document root).
pub fn array_at<'a>(body: &'a Value, pointer: &str) -> Result<&'a Vec<Value>, FetchError> {
    body.pointer(pointer)
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Parse(format!("missing array {pointer}")))
}

/// Field `field` of the last element of the array at `pointer`.
pub fn last_field(body: &Value, pointer: &str, field: &str) -> Result<f64, FetchError> {
    let items = array_at(body, pointer)?;
    let last = items
        .last()
        .ok_or_else(|| FetchError::Parse(format!("empty array {pointer}")))?;
    last.get(field)
        .and_then(as_number)
        .ok_or_else(|| FetchError::Parse(format!("last element of {pointer} has no {field}")))
}

/// Column `index` of every row in an array of arrays, skipping bad rows.
pub fn column(rows: &[Value], index: usize) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.as_array()?.get(index).and_then(as_number))
        .collect()
}
