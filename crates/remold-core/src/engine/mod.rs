//! Transformation engine
//!
//! The engine is built once from a [`TransformConfig`] and then applied to
//! any number of source documents. Construction validates everything it can:
//! every path and expression in the configuration compiles up front, and the
//! output templates parse. At transform time only a malformed source document
//! is an error; individual mappings degrade with a diagnostic instead of
//! failing the document.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

pub mod convert;
pub mod expr;
pub mod path;
pub mod special;

use crate::config::{FieldMapping, TransformConfig};
use crate::error::{Error, Result};
use expr::ExpressionEngine;
use path::PathNavigator;
use serde_json::{json, Map, Value};
use special::SpecialRegistry;

/// Configuration-driven JSON to JSON transformer
///
/// Owns its own path and expression caches and its own special expression
/// registry; engines never share state.
pub struct TransformEngine {
    config: TransformConfig,
    template: Option<Value>,
    target_seed: Option<Value>,
    navigator: PathNavigator,
    expressions: ExpressionEngine,
    specials: SpecialRegistry,
}

impl TransformEngine {
    /// Build an engine, compiling every path and expression in the
    /// configuration
    pub fn new(config: TransformConfig) -> Result<Self> {
        let navigator = PathNavigator::new();
        let expressions = ExpressionEngine::new();
        let specials = SpecialRegistry::with_builtins();

        let compile_path = |path: &str| {
            navigator
                .precompile(path)
                .map_err(|source| Error::PathCompilation {
                    path: path.to_string(),
                    source,
                })
        };
        let compile_expression = |expression: &str| {
            if specials.is_special(expression) {
                return Ok(());
            }
            expressions
                .precompile(expression)
                .map_err(|source| Error::ExpressionCompilation {
                    expression: expression.to_string(),
                    source,
                })
        };

        // Template mappings never consult sourcePath, so only the paths the
        // transform will actually use are validated
        for mapping in &config.template_mappings {
            if let Some(path) = mapping.target_path() {
                compile_path(path)?;
            }
            if let Some(expression) = mapping.transform_expression() {
                compile_expression(expression)?;
            }
        }

        for mapping in &config.mappings {
            for path in [mapping.source_path(), mapping.target_path()]
                .into_iter()
                .flatten()
            {
                compile_path(path)?;
            }
            if let Some(expression) = mapping.transform_expression() {
                compile_expression(expression)?;
            }
        }

        if let Some(path) = config.target_node_path() {
            compile_path(path)?;
        }

        let template = match config.final_json_template() {
            Some(text) => Some(serde_json::from_str(text).map_err(|e| Error::Configuration {
                message: format!("finalJsonTemplate is not valid JSON: {}", e),
            })?),
            None => None,
        };

        // A broken per-object skeleton degrades to the default empty object
        let target_seed = config.target_json().and_then(|text| {
            match serde_json::from_str::<Value>(text) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("targetJson is not valid JSON, ignoring: {}", e);
                    None
                }
            }
        });

        log::info!(
            "Transformation engine ready: {} mapping(s), {} template mapping(s), mode: {}",
            config.mappings.len(),
            config.template_mappings.len(),
            if template.is_some() { "templated" } else { "direct" },
        );

        Ok(Self {
            config,
            template,
            target_seed,
            navigator,
            expressions,
            specials,
        })
    }

    /// Transform a source JSON document
    ///
    /// The only call-time error is a source that does not parse as JSON.
    pub fn transform(&self, source_json: &str) -> Result<Value> {
        let source: Value = serde_json::from_str(source_json)?;
        Ok(self.transform_value(&source))
    }

    /// Transform an already-parsed source document
    pub fn transform_value(&self, source: &Value) -> Value {
        match &self.template {
            Some(template) => self.transform_templated(template, source),
            None => self.transform_direct(source),
        }
    }

    /// Direct mode: an array source yields an array of transformed objects
    fn transform_direct(&self, source: &Value) -> Value {
        match source {
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.transform_object(item)).collect())
            }
            other => self.transform_object(other),
        }
    }

    /// Templated mode: fill the skeleton, then insert the transformed
    /// payload at the configured node path
    fn transform_templated(&self, template: &Value, source: &Value) -> Value {
        let mut output = template.clone();
        self.apply_template_mappings(&mut output);

        let payload = self.transform_direct(source);
        self.insert_payload(&mut output, payload);
        output
    }

    fn apply_template_mappings(&self, output: &mut Value) {
        match output {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.fill_template_fields(item);
                }
            }
            other => self.fill_template_fields(other),
        }
    }

    /// Template mappings need both a target path and an expression; the
    /// expression runs with no input binding
    fn fill_template_fields(&self, node: &mut Value) {
        for mapping in &self.config.template_mappings {
            let (Some(target), Some(expression)) =
                (mapping.target_path(), mapping.transform_expression())
            else {
                continue;
            };

            let value = match self.specials.process(expression, None) {
                Some(result) => result,
                None => self.expressions.evaluate(expression, None),
            };
            let value = self.coerce(value, mapping);
            self.navigator.write(node, target, value);
        }
    }

    /// Insert the transformed payload at targetNodePath
    ///
    /// An array-rooted skeleton has no object to anchor the write, so it is
    /// wrapped in a single-field object for the duration of the write.
    fn insert_payload(&self, output: &mut Value, payload: Value) {
        let Some(path) = self.config.target_node_path() else {
            log::warn!("No targetNodePath configured, transformed payload discarded");
            return;
        };

        if output.is_array() {
            let inner = std::mem::take(output);
            let mut wrapper = json!({ "result": inner });
            let wrapped_path = format!("result{}", path.trim_start_matches('$'));
            self.navigator.write(&mut wrapper, &wrapped_path, payload);
            *output = wrapper["result"].take();
        } else {
            self.navigator.write(output, path, payload);
        }
    }

    /// Apply every field mapping to one source object
    fn transform_object(&self, source: &Value) -> Value {
        let mut output = self
            .target_seed
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));

        for mapping in &self.config.mappings {
            let Some(target) = mapping.target_path() else {
                log::warn!("Mapping has no targetPath, skipping: {}", mapping.describe());
                continue;
            };

            // Absence and an explicit null are distinct inputs
            let resolved: Option<Value> = mapping
                .source_path()
                .and_then(|path| self.navigator.read(source, path))
                .cloned();

            let value = if let Some(expression) = mapping.transform_expression() {
                match self.specials.process(expression, resolved.as_ref()) {
                    Some(result) => result,
                    None => self.expressions.evaluate(expression, resolved.as_ref()),
                }
            } else if mapping.source_path().is_none() {
                log::warn!(
                    "Mapping has neither sourcePath nor transformExpression, skipping: {}",
                    mapping.describe()
                );
                continue;
            } else {
                resolved.unwrap_or(Value::Null)
            };

            let value = self.coerce(value, mapping);
            self.navigator.write(&mut output, target, value);
        }

        output
    }

    fn coerce(&self, value: Value, mapping: &FieldMapping) -> Value {
        match mapping.target_type() {
            Some(type_name) => convert::coerce_or_keep(value, type_name),
            None => value,
        }
    }
}
