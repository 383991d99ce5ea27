//! Path navigator with a concurrent compiled-path cache
//!
//! Reads never fail for a missing path; writes create missing intermediate
//! containers, and degrade to a no-op with a diagnostic when the tree shape
//! contradicts the path. A single bad mapping must not fail a whole document
//! transform.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use super::ast::{CompiledPath, Segment};
use super::parser::Parser;
use super::{clean_path, value_kind, PathError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Compiles, caches, and navigates path expressions
///
/// The cache is keyed by the path text with the optional `$.` prefix
/// stripped, and only grows. Concurrent misses may compile the same path
/// twice; the first insert wins and the duplicate is discarded.
#[derive(Debug, Default)]
pub struct PathNavigator {
    cache: RwLock<HashMap<String, Arc<CompiledPath>>>,
}

impl PathNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and cache a path expression, failing on malformed syntax
    pub fn precompile(&self, path: &str) -> Result<(), PathError> {
        self.compiled(path).map(|_| ())
    }

    /// Look up or compile the path, first successful insert wins
    pub fn compiled(&self, path: &str) -> Result<Arc<CompiledPath>, PathError> {
        let key = clean_path(path);
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(key) {
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = Arc::new(Parser::new(key)?.parse()?);
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key.to_string()).or_insert(compiled)))
    }

    /// Read the value at a path, `None` when the path does not exist
    ///
    /// An explicit JSON null reads as `Some(Value::Null)`; absence and null
    /// are distinct.
    pub fn read<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        let compiled = match self.compiled(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Read failed for path '{}': {}", path, e);
                return None;
            }
        };

        let mut current = root;
        for segment in compiled.segments() {
            current = match segment {
                Segment::Field(name) => current.as_object()?.get(name)?,
                Segment::Index { field, index } => {
                    let owner = match field {
                        Some(name) => current.as_object()?.get(name)?,
                        None => current,
                    };
                    owner.as_array()?.get(*index)?
                }
            };
        }
        Some(current)
    }

    /// Walk every segment except the last, creating missing containers, and
    /// return the container that owns the final segment
    pub fn resolve_or_create<'a>(
        &self,
        root: &'a mut Value,
        path: &str,
    ) -> Result<&'a mut Value, PathError> {
        let compiled = self.compiled(path)?;
        let mut current = root;
        for segment in compiled.parents() {
            current = descend(current, segment)?;
        }
        Ok(current)
    }

    /// The trailing field name of a path
    pub fn final_segment(&self, path: &str) -> Result<String, PathError> {
        Ok(self.compiled(path)?.final_field_name())
    }

    /// Write a value at a path, creating intermediate containers as needed
    ///
    /// On any failure the write degrades to a no-op and a diagnostic is
    /// recorded; the failure never propagates.
    pub fn write(&self, root: &mut Value, path: &str, value: Value) {
        if let Err(e) = self.try_write(root, path, value) {
            log::warn!("Path write degraded to no-op for '{}': {}", path, e);
        }
    }

    fn try_write(&self, root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
        let compiled = self.compiled(path)?;
        let mut current = root;
        for segment in compiled.parents() {
            current = descend(current, segment)?;
        }
        set_segment(current, compiled.last(), value)
    }
}

/// Step into one segment, creating the container it names if absent
fn descend<'a>(current: &'a mut Value, segment: &Segment) -> Result<&'a mut Value, PathError> {
    match segment {
        Segment::Field(name) => field_entry(current, name),
        Segment::Index { field, index } => {
            let array = index_array(current, field.as_deref())?;
            while array.len() <= *index {
                array.push(Value::Object(Map::new()));
            }
            Ok(&mut array[*index])
        }
    }
}

/// Place a value at the final segment of a resolved container
fn set_segment(container: &mut Value, segment: &Segment, value: Value) -> Result<(), PathError> {
    match segment {
        Segment::Field(name) => {
            let found = value_kind(container);
            let obj = container
                .as_object_mut()
                .ok_or(PathError::TypeMismatch {
                    expected: "object",
                    found,
                    segment: name.clone(),
                })?;
            obj.insert(name.clone(), value);
            Ok(())
        }
        Segment::Index { field, index } => {
            let array = index_array(container, field.as_deref())?;
            while array.len() <= *index {
                array.push(Value::Object(Map::new()));
            }
            array[*index] = value;
            Ok(())
        }
    }
}

/// Field slot in an object, created empty if absent
fn field_entry<'a>(current: &'a mut Value, name: &str) -> Result<&'a mut Value, PathError> {
    let found = value_kind(current);
    let obj = current.as_object_mut().ok_or(PathError::TypeMismatch {
        expected: "object",
        found,
        segment: name.to_string(),
    })?;
    Ok(obj
        .entry(name.to_string())
        .or_insert_with(|| Value::Object(Map::new())))
}

/// Array named by an index segment, created if absent, error on mismatch
fn index_array<'a>(
    current: &'a mut Value,
    field: Option<&str>,
) -> Result<&'a mut Vec<Value>, PathError> {
    let slot = match field {
        Some(name) => {
            let found = value_kind(current);
            let obj = current.as_object_mut().ok_or(PathError::TypeMismatch {
                expected: "object",
                found,
                segment: name.to_string(),
            })?;
            obj.entry(name.to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
        }
        None => current,
    };

    let found = value_kind(slot);
    let segment = field.unwrap_or("[]").to_string();
    slot.as_array_mut().ok_or(PathError::TypeMismatch {
        expected: "array",
        found,
        segment,
    })
}
