//! Lenient integer parsing for questionnaire answers
//!
//! Answers arrive from browser forms as numbers or strings. Numbers are
//! truncated toward zero. Text reads as its leading decimal integer and
//! whatever follows is ignored, so `"5"`, `5`, `5.9` and `"5 - agree"` all
//! read as 5.

use serde_json::{Number, Value};

/// Parse an answer into an integer, or `None` when it has no leading digits.
///
/// Range checking is left to the caller.
pub fn parse_item_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => number_value(n),
        other => parse_leading_int(&render(other)?),
    }
}

/// Integer part of a JSON number, saturating at the i64 bounds
fn number_value(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    let f = n.as_f64()?;
    // `as` saturates out-of-range floats
    f.is_finite().then(|| f.trunc() as i64)
}

/// Render a JSON value to the text the integer parse reads from
fn render(value: &Value) -> Option<String> {
    match value {
        // f64 Display never switches to exponent notation
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if !(n.is_i64() || n.is_u64()) => f.to_string(),
            _ => n.to_string(),
        }),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::Null => Some(String::new()),
                    other => render(other),
                })
                .collect();
            parts.map(|p| p.join(","))
        }
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}

/// Leading `[+-]?[0-9]+` after optional whitespace
fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    // Overflowing runs are far outside the scale; saturate instead of failing.
    let magnitude = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
