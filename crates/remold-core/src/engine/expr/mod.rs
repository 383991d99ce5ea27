//! General transform expression engine
//!
//! Expressions are a closed grammar over a single implicit binding named
//! `value`: arithmetic, string concatenation, comparison, logic, ternary
//! conditionals, and a small builtin function set. There is deliberately no
//! access to external state, files, or network; the grammar is the sandbox.
//!
//! Each distinct expression text compiles once and is cached by its literal
//! text. Evaluation failures return the original input value unchanged with
//! a diagnostic; they never propagate to the caller.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{BinaryOp, Builtin, Expr, Literal, UnaryOp};
pub use parser::Parser;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised while parsing or evaluating transform expressions
#[derive(Error, Debug, Clone)]
pub enum ExprError {
    /// Parse errors during expression compilation
    #[error("Parse error at position {position}: {message}")]
    Parse { message: String, position: usize },

    /// An identifier other than the `value` binding was referenced
    #[error("Unknown identifier: '{name}' (only 'value' is bound)")]
    UnknownIdentifier { name: String },

    /// A function outside the builtin set was called
    #[error("Unknown function: '{name}'")]
    UnknownFunction { name: String },

    /// An operation met a value of the wrong type
    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },

    /// Division or remainder by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// The numeric result cannot be represented as JSON
    #[error("Result is not representable as a JSON number: {value}")]
    NotRepresentable { value: f64 },
}

/// Compiles, caches, and evaluates transform expressions
///
/// The cache is keyed by the literal expression text and only grows.
/// Concurrent misses may compile the same expression twice; the first
/// insert wins.
#[derive(Debug, Default)]
pub struct ExpressionEngine {
    cache: RwLock<HashMap<String, Arc<Expr>>>,
}

impl ExpressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and cache an expression, failing on malformed syntax
    pub fn precompile(&self, expression: &str) -> Result<(), ExprError> {
        self.compiled(expression).map(|_| ())
    }

    fn compiled(&self, expression: &str) -> Result<Arc<Expr>, ExprError> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(expression) {
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = Arc::new(Parser::new(expression)?.parse()?);
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(
            cache.entry(expression.to_string()).or_insert(compiled),
        ))
    }

    /// Evaluate an expression against the current input value
    ///
    /// `input` absent binds `value` to null. On any failure the original
    /// input is returned unchanged and a diagnostic recorded.
    pub fn evaluate(&self, expression: &str, input: Option<&Value>) -> Value {
        let bound = input.cloned().unwrap_or(Value::Null);

        let compiled = match self.compiled(expression) {
            Ok(c) => c,
            Err(e) => {
                log::warn!(
                    "Expression compilation failed at evaluation time: '{}': {}",
                    expression,
                    e
                );
                return bound;
            }
        };

        match eval::evaluate(&compiled, &bound) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Expression evaluation failed: '{}': {}", expression, e);
                bound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_with_binding() {
        let engine = ExpressionEngine::new();
        assert_eq!(engine.evaluate("value + 1", Some(&json!(41))), json!(42));
    }

    #[test]
    fn test_evaluate_absent_input_binds_null() {
        let engine = ExpressionEngine::new();
        assert_eq!(
            engine.evaluate("value == null ? 'none' : 'some'", None),
            json!("none")
        );
    }

    #[test]
    fn test_evaluation_failure_returns_input_unchanged() {
        let engine = ExpressionEngine::new();
        assert_eq!(
            engine.evaluate("value - 1", Some(&json!("not a number"))),
            json!("not a number")
        );
    }

    #[test]
    fn test_precompile_rejects_malformed_expression() {
        let engine = ExpressionEngine::new();
        assert!(engine.precompile("value +").is_err());
        assert!(engine.precompile("system('ls')").is_err());
    }

    #[test]
    fn test_cache_converges_to_one_entry() {
        let engine = ExpressionEngine::new();
        let first = engine.compiled("value * 2").unwrap();
        let second = engine.compiled("value * 2").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
