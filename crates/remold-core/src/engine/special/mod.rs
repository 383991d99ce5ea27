//! Special expression dispatch
//!
//! Expressions of the shape `@<type>:<command>` bypass the general
//! expression engine and dispatch to a registered processor keyed by
//! `<type>`. The registry is owned by the engine instance that built it,
//! never process-wide; processors register once at construction.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

pub mod time;

pub use time::TimeProcessor;

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failure inside a special expression processor
///
/// Always recoverable: the registry returns the pre-processing input
/// unchanged and records a diagnostic.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct SpecialError {
    pub message: String,
}

impl SpecialError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A pluggable value processor behind an `@type:` prefix
pub trait SpecialProcessor: Send + Sync {
    /// Dispatch key, the `<type>` part of `@type:command`
    fn kind(&self) -> &'static str;

    /// Human-readable description used in diagnostics
    fn description(&self) -> &'static str;

    /// Process the full expression against the current input value
    fn process(&self, expression: &str, input: Option<&Value>) -> Result<Value, SpecialError>;
}

/// Prefix-keyed dispatch table of special expression processors
pub struct SpecialRegistry {
    processors: HashMap<&'static str, Box<dyn SpecialProcessor>>,
}

impl SpecialRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Registry with all built-in processors registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TimeProcessor));
        registry
    }

    pub fn register(&mut self, processor: Box<dyn SpecialProcessor>) {
        log::info!(
            "Registered special expression processor: {} - {}",
            processor.kind(),
            processor.description()
        );
        self.processors.insert(processor.kind(), processor);
    }

    /// Extract the `<type>` of a special expression, `None` when the text
    /// does not have the `@type:command` shape
    pub fn expression_kind(expression: &str) -> Option<&str> {
        let rest = expression.strip_prefix('@')?;
        let colon = rest.find(':')?;
        Some(&rest[..colon])
    }

    /// Whether the expression dispatches to a registered processor
    pub fn is_special(&self, expression: &str) -> bool {
        Self::expression_kind(expression)
            .map_or(false, |kind| self.processors.contains_key(kind))
    }

    /// Dispatch a special expression
    ///
    /// `None` means "not a special expression, use the general engine".
    /// A processor failure returns the pre-processing input unchanged.
    pub fn process(&self, expression: &str, input: Option<&Value>) -> Option<Value> {
        let kind = Self::expression_kind(expression)?;
        let processor = self.processors.get(kind)?;

        match processor.process(expression, input) {
            Ok(result) => Some(result),
            Err(e) => {
                log::warn!(
                    "Special expression failed: '{}', processor: {}, error: {}",
                    expression,
                    processor.kind(),
                    e
                );
                Some(input.cloned().unwrap_or(Value::Null))
            }
        }
    }

    /// Registered processors as `kind: description` labels
    pub fn registered(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .processors
            .values()
            .map(|p| format!("{}: {}", p.kind(), p.description()))
            .collect();
        labels.sort();
        labels
    }
}

impl Default for SpecialRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
