//! Time expression processor
//!
//! Handles `@time:` expressions: current-time generation and timestamp
//! formatting. Format commands use SimpleDateFormat-style tokens (`yyyy`,
//! `MM`, `dd`, `HH`, `mm`, `ss`, `SSS`), translated to chrono specifiers.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use super::{SpecialError, SpecialProcessor};
use chrono::{TimeZone, Utc};
use serde_json::Value;

const PREFIX: &str = "@time:";

/// Timestamps above this magnitude are taken as milliseconds, below as
/// seconds
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Built-in `time` processor
pub struct TimeProcessor;

impl SpecialProcessor for TimeProcessor {
    fn kind(&self) -> &'static str {
        "time"
    }

    fn description(&self) -> &'static str {
        "current time generation and timestamp formatting"
    }

    fn process(&self, expression: &str, input: Option<&Value>) -> Result<Value, SpecialError> {
        let command = expression
            .strip_prefix(PREFIX)
            .ok_or_else(|| SpecialError::new(format!("not a time expression: {}", expression)))?;

        if command.starts_with("current") {
            return Ok(current_time(command));
        }
        format_timestamp(input, command)
    }
}

fn current_time(command: &str) -> Value {
    let now = Utc::now();
    match command {
        "current:s" => Value::from(now.timestamp()),
        // "current:ms" and any other current variant yield milliseconds
        _ => Value::from(now.timestamp_millis()),
    }
}

/// Format a numeric timestamp taken from the input value
///
/// A non-numeric or absent input yields an empty string, not an error.
fn format_timestamp(input: Option<&Value>, format: &str) -> Result<Value, SpecialError> {
    let Some(timestamp) = extract_timestamp(input) else {
        return Ok(Value::String(String::new()));
    };

    let millis = if timestamp > MILLIS_THRESHOLD {
        timestamp
    } else {
        timestamp * 1000
    };

    let datetime = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| SpecialError::new(format!("timestamp out of range: {}", millis)))?;

    let pattern = translate_format(format)?;
    Ok(Value::String(datetime.format(&pattern).to_string()))
}

fn extract_timestamp(input: Option<&Value>) -> Option<i64> {
    match input? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().trim_matches('"').parse::<i64>().ok(),
        _ => None,
    }
}

/// Translate a SimpleDateFormat-style pattern to a chrono format string
fn translate_format(pattern: &str) -> Result<String, SpecialError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            // Quoted literal section
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            if i >= chars.len() {
                return Err(SpecialError::new("unterminated quoted literal in format"));
            }
            i += 1;
            continue;
        }

        if !ch.is_ascii_alphabetic() {
            push_literal(&mut out, ch);
            i += 1;
            continue;
        }

        let mut run = 0;
        while i + run < chars.len() && chars[i + run] == ch {
            run += 1;
        }
        i += run;

        let spec = match (ch, run) {
            ('y', 4) => "%Y",
            ('y', 2) => "%y",
            ('M', 2) => "%m",
            ('M', 1) => "%-m",
            ('d', 2) => "%d",
            ('d', 1) => "%-d",
            ('H', 2) => "%H",
            ('H', 1) => "%-H",
            ('m', 2) => "%M",
            ('m', 1) => "%-M",
            ('s', 2) => "%S",
            ('s', 1) => "%-S",
            ('S', 3) => "%3f",
            ('a', _) => "%p",
            ('E', _) => "%a",
            _ => {
                return Err(SpecialError::new(format!(
                    "unsupported format token: {}",
                    ch.to_string().repeat(run)
                )))
            }
        };
        out.push_str(spec);
    }

    Ok(out)
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn process(expr: &str, input: Option<&Value>) -> Value {
        TimeProcessor.process(expr, input).unwrap()
    }

    #[test]
    fn test_current_ms_is_nondecreasing() {
        let first = process("@time:current:ms", None);
        let second = process("@time:current:ms", None);
        assert!(second.as_i64().unwrap() >= first.as_i64().unwrap());
        assert!(first.as_i64().unwrap() > MILLIS_THRESHOLD);
    }

    #[test]
    fn test_current_seconds() {
        let seconds = process("@time:current:s", None).as_i64().unwrap();
        assert!(seconds > 1_000_000_000 && seconds < MILLIS_THRESHOLD);
    }

    #[test]
    fn test_unrecognized_current_variant_yields_millis() {
        let value = process("@time:current", None).as_i64().unwrap();
        assert!(value > MILLIS_THRESHOLD);
    }

    #[test]
    fn test_seconds_and_millis_format_to_the_same_year() {
        let from_seconds = process("@time:yyyy", Some(&json!(1_700_000_000_i64)));
        let from_millis = process("@time:yyyy", Some(&json!(1_700_000_000_000_i64)));
        assert_eq!(from_seconds, json!("2023"));
        assert_eq!(from_millis, from_seconds);
    }

    #[test]
    fn test_full_datetime_format() {
        let formatted = process("@time:yyyy-MM-dd HH:mm:ss", Some(&json!(0)));
        assert_eq!(formatted, json!("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_string_timestamp_input() {
        let formatted = process("@time:yyyy", Some(&json!("1700000000")));
        assert_eq!(formatted, json!("2023"));
    }

    #[test]
    fn test_non_numeric_input_yields_empty_string() {
        assert_eq!(process("@time:yyyy", Some(&json!("not a number"))), json!(""));
        assert_eq!(process("@time:yyyy", Some(&json!({"a": 1}))), json!(""));
        assert_eq!(process("@time:yyyy", None), json!(""));
    }

    #[test]
    fn test_unsupported_token_is_an_error() {
        assert!(TimeProcessor.process("@time:QQQQ", Some(&json!(0))).is_err());
    }

    #[test]
    fn test_quoted_literal_in_format() {
        let formatted = process("@time:yyyy'T'MM", Some(&json!(0)));
        assert_eq!(formatted, json!("1970T01"));
    }
}
