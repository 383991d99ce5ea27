//! Compiled form of path expressions
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object field access (`.name`)
    Field(String),
    /// Array index access (`name[2]`), or a bare index (`[2]`) when the
    /// current container is itself an array
    Index { field: Option<String>, index: usize },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::Index {
                field: Some(name),
                index,
            } => write!(f, "{}[{}]", name, index),
            Segment::Index { field: None, index } => write!(f, "[{}]", index),
        }
    }
}

/// A parsed path expression ready for navigation
///
/// Invariant: `segments` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    segments: Vec<Segment>,
}

impl CompiledPath {
    pub(crate) fn new(segments: Vec<Segment>) -> Self {
        debug_assert!(!segments.is_empty());
        Self { segments }
    }

    /// All segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every segment except the last; the walk that `resolve_or_create`
    /// performs to find the container owning the final segment
    pub fn parents(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The trailing segment written into the resolved container
    pub fn last(&self) -> &Segment {
        self.segments.last().expect("compiled path is never empty")
    }

    /// The field name of the trailing segment
    pub fn final_field_name(&self) -> String {
        match self.last() {
            Segment::Field(name) => name.clone(),
            Segment::Index {
                field: Some(name), ..
            } => name.clone(),
            Segment::Index { field: None, index } => format!("[{}]", index),
        }
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_and_last() {
        let path = CompiledPath::new(vec![
            Segment::Field("a".to_string()),
            Segment::Index {
                field: Some("b".to_string()),
                index: 2,
            },
            Segment::Field("c".to_string()),
        ]);
        assert_eq!(path.parents().len(), 2);
        assert_eq!(path.last(), &Segment::Field("c".to_string()));
        assert_eq!(path.final_field_name(), "c");
        assert_eq!(path.to_string(), "a.b[2].c");
    }

    #[test]
    fn test_single_segment_has_empty_parents() {
        let path = CompiledPath::new(vec![Segment::Field("only".to_string())]);
        assert!(path.parents().is_empty());
        assert_eq!(path.final_field_name(), "only");
    }
}
