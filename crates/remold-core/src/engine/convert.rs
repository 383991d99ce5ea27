//! Type coercion strategies
//!
//! A fixed table maps canonical, case-insensitive type names to coercion
//! strategies over JSON values. Null passes through every strategy; numeric
//! strategies accept any numeric source (narrowing truncates) or a parseable
//! string; boolean accepts numbers and the words `true`/`1`/`yes`. A failed
//! or unknown coercion keeps the original value at the call site.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use serde_json::{Number, Value};
use thiserror::Error;

/// Coercion failure; always recoverable at the call site
#[derive(Error, Debug, Clone)]
pub enum ConvertError {
    /// The source value's type has no conversion to the target
    #[error("Cannot convert {from} to {to}")]
    UnsupportedSource { from: &'static str, to: &'static str },

    /// A string source did not parse as the target type
    #[error("Cannot parse '{value}' as {to}")]
    UnparseableString { value: String, to: &'static str },

    /// The numeric result cannot be represented as JSON
    #[error("Value is not representable as {to}")]
    NotRepresentable { to: &'static str },
}

/// Canonical target types for coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    String,
    Int,
    Long,
    Double,
    Float,
    Boolean,
}

impl TargetType {
    /// Resolve a canonical, case-insensitive type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "string" | "str" => Some(TargetType::String),
            "int" | "integer" => Some(TargetType::Int),
            "long" => Some(TargetType::Long),
            "double" => Some(TargetType::Double),
            "float" => Some(TargetType::Float),
            "boolean" | "bool" => Some(TargetType::Boolean),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetType::String => "string",
            TargetType::Int => "int",
            TargetType::Long => "long",
            TargetType::Double => "double",
            TargetType::Float => "float",
            TargetType::Boolean => "boolean",
        }
    }
}

/// Coerce a value to the target type
pub fn coerce(value: &Value, target: TargetType) -> Result<Value, ConvertError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match target {
        TargetType::String => to_string(value),
        TargetType::Int => to_i64(value, target).map(|i| Value::from(i as i32 as i64)),
        TargetType::Long => to_i64(value, target).map(Value::from),
        TargetType::Double => to_f64(value, target).and_then(|f| finite_number(f, target)),
        TargetType::Float => {
            to_f64(value, target).and_then(|f| finite_number(f as f32 as f64, target))
        }
        TargetType::Boolean => to_bool(value),
    }
}

/// Call-site wrapper: unknown type names and conversion failures keep the
/// original value, with a diagnostic
pub fn coerce_or_keep(value: Value, type_name: &str) -> Value {
    let Some(target) = TargetType::from_name(type_name) else {
        log::warn!("No type converter for '{}', keeping original value", type_name);
        return value;
    };
    match coerce(&value, target) {
        Ok(converted) => converted,
        Err(e) => {
            log::warn!(
                "Type conversion failed ({} -> {}): {}, keeping original value",
                value_kind(&value),
                target.name(),
                e
            );
            value
        }
    }
}

fn to_string(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(ConvertError::UnsupportedSource {
            from: value_kind(other),
            to: "string",
        }),
    }
}

fn to_i64(value: &Value, target: TargetType) -> Result<i64, ConvertError> {
    match value {
        // Narrowing from a float truncates, like the numeric cast it mirrors
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or(ConvertError::NotRepresentable { to: target.name() }),
        Value::String(s) => s.parse::<i64>().map_err(|_| ConvertError::UnparseableString {
            value: s.clone(),
            to: target.name(),
        }),
        other => Err(ConvertError::UnsupportedSource {
            from: value_kind(other),
            to: target.name(),
        }),
    }
}

fn to_f64(value: &Value, target: TargetType) -> Result<f64, ConvertError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or(ConvertError::NotRepresentable { to: target.name() }),
        Value::String(s) => s.parse::<f64>().map_err(|_| ConvertError::UnparseableString {
            value: s.clone(),
            to: target.name(),
        }),
        other => Err(ConvertError::UnsupportedSource {
            from: value_kind(other),
            to: target.name(),
        }),
    }
}

fn to_bool(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => {
            let lower = s.to_lowercase();
            Ok(Value::Bool(matches!(
                lower.as_str(),
                "true" | "1" | "yes"
            )))
        }
        Value::Number(n) => Ok(Value::Bool(n.as_f64().map_or(false, |f| f != 0.0))),
        other => Err(ConvertError::UnsupportedSource {
            from: value_kind(other),
            to: "boolean",
        }),
    }
}

fn finite_number(f: f64, target: TargetType) -> Result<Value, ConvertError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(ConvertError::NotRepresentable { to: target.name() })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_lookup_is_case_insensitive() {
        assert_eq!(TargetType::from_name("STRING"), Some(TargetType::String));
        assert_eq!(TargetType::from_name("Integer"), Some(TargetType::Int));
        assert_eq!(TargetType::from_name(" bool "), Some(TargetType::Boolean));
        assert_eq!(TargetType::from_name("decimal"), None);
    }

    #[test]
    fn test_null_passes_through_every_target() {
        for target in [
            TargetType::String,
            TargetType::Int,
            TargetType::Long,
            TargetType::Double,
            TargetType::Float,
            TargetType::Boolean,
        ] {
            assert_eq!(coerce(&Value::Null, target).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_already_correct_type_passes_through() {
        assert_eq!(coerce(&json!("x"), TargetType::String).unwrap(), json!("x"));
        assert_eq!(coerce(&json!(5), TargetType::Int).unwrap(), json!(5));
        assert_eq!(coerce(&json!(true), TargetType::Boolean).unwrap(), json!(true));
    }

    #[test]
    fn test_numeric_string_parses() {
        assert_eq!(coerce(&json!("42"), TargetType::Int).unwrap(), json!(42));
        assert_eq!(coerce(&json!("2.5"), TargetType::Double).unwrap(), json!(2.5));
        assert_eq!(coerce(&json!("9000000000"), TargetType::Long).unwrap(), json!(9000000000_i64));
    }

    #[test]
    fn test_float_string_does_not_parse_as_int() {
        assert!(matches!(
            coerce(&json!("3.14"), TargetType::Int),
            Err(ConvertError::UnparseableString { .. })
        ));
    }

    #[test]
    fn test_narrowing_truncates() {
        assert_eq!(coerce(&json!(3.9), TargetType::Int).unwrap(), json!(3));
        assert_eq!(coerce(&json!(-3.9), TargetType::Long).unwrap(), json!(-3));
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(coerce(&json!(7), TargetType::String).unwrap(), json!("7"));
        assert_eq!(coerce(&json!(2.5), TargetType::String).unwrap(), json!("2.5"));
    }

    #[test]
    fn test_boolean_words_and_numbers() {
        assert_eq!(coerce(&json!("yes"), TargetType::Boolean).unwrap(), json!(true));
        assert_eq!(coerce(&json!("YES"), TargetType::Boolean).unwrap(), json!(true));
        assert_eq!(coerce(&json!("no"), TargetType::Boolean).unwrap(), json!(false));
        assert_eq!(coerce(&json!("anything"), TargetType::Boolean).unwrap(), json!(false));
        assert_eq!(coerce(&json!(0), TargetType::Boolean).unwrap(), json!(false));
        assert_eq!(coerce(&json!(7), TargetType::Boolean).unwrap(), json!(true));
    }

    #[test]
    fn test_container_sources_are_unsupported() {
        assert!(coerce(&json!([1]), TargetType::Int).is_err());
        assert!(coerce(&json!({"a": 1}), TargetType::String).is_err());
        assert!(coerce(&json!(true), TargetType::Int).is_err());
    }

    #[test]
    fn test_coerce_or_keep_keeps_original_on_failure() {
        assert_eq!(coerce_or_keep(json!("3.14"), "int"), json!("3.14"));
        assert_eq!(coerce_or_keep(json!(5), "unknown-type"), json!(5));
        assert_eq!(coerce_or_keep(json!("42"), "int"), json!(42));
    }
}
