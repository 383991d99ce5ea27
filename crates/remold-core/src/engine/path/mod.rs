//! Path navigation engine for reading and creating nested JSON structure
//!
//! A path expression such as `a.b[2].c` (with an optional leading `$.`)
//! addresses one location in a JSON tree. Reads walk the tree without
//! modifying it; writes create missing intermediate containers on the way
//! down. Compiled paths are cached per navigator instance.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod navigator;
pub mod parser;


pub use ast::{CompiledPath, Segment};
pub use navigator::PathNavigator;
pub use parser::Parser;

use thiserror::Error;

/// Errors raised while parsing or navigating path expressions
#[derive(Error, Debug, Clone)]
pub enum PathError {
    /// The path expression is empty
    #[error("Empty path expression")]
    EmptyPath,

    /// A segment between separators is empty
    #[error("Empty path segment at position {position}")]
    EmptySegment { position: usize },

    /// An unexpected character was found while parsing
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    /// A bracketed index is missing its closing bracket
    #[error("Unterminated bracket at position {position}")]
    UnterminatedBracket { position: usize },

    /// A bracketed index is not a non-negative integer
    #[error("Invalid array index: '{text}'")]
    InvalidIndex { text: String },

    /// Navigation met a value of the wrong shape
    #[error("Type mismatch at segment '{segment}': expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        segment: String,
    },
}

/// Strip the optional `$.` prefix, yielding the cache key for a path
pub(crate) fn clean_path(path: &str) -> &str {
    path.strip_prefix("$.").unwrap_or(path)
}

/// Short type name of a JSON value, for diagnostics
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_path_strips_prefix() {
        assert_eq!(clean_path("$.a.b"), "a.b");
        assert_eq!(clean_path("a.b"), "a.b");
        assert_eq!(clean_path("$[0].a"), "$[0].a");
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(value_kind(&json!(null)), "null");
        assert_eq!(value_kind(&json!([1])), "array");
        assert_eq!(value_kind(&json!({"a": 1})), "object");
    }
}
