//! Error types for the Remold core library
//!
//! This module defines the error handling system for Remold, using thiserror
//! for ergonomic error definitions. Errors split into two tiers: construction
//! failures (malformed paths, expressions, or templates in the configuration)
//! and the single call-time failure of a malformed source document. Everything
//! else degrades per mapping and is reported through `log` diagnostics.

use crate::engine::expr::ExprError;
use crate::engine::path::PathError;
use thiserror::Error;

/// Main error type for Remold operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors detected at engine construction
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A path expression in the configuration failed to compile
    #[error("Path compilation failed for '{path}': {source}")]
    PathCompilation {
        path: String,
        #[source]
        source: PathError,
    },

    /// A transform expression in the configuration failed to compile
    #[error("Expression compilation failed for '{expression}': {source}")]
    ExpressionCompilation {
        expression: String,
        #[source]
        source: ExprError,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Configuration {
            message: "missing mappings".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing mappings");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
