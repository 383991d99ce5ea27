//! Configuration model for the transformation engine
//!
//! A [`TransformConfig`] is supplied once at engine construction and never
//! mutated afterwards. The wire schema is camelCase JSON; empty or blank
//! strings count as absent, matching how callers tend to hand-edit mapping
//! files.

use serde::{Deserialize, Serialize};

/// One declarative rule producing a single output field from an optional
/// input field via an optional expression and optional type coercion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMapping {
    /// Path expression locating the value in the source object
    pub source_path: Option<String>,
    /// Path expression locating the field in the output object
    pub target_path: Option<String>,
    /// Transform expression, either general or special (`@type:command`)
    pub transform_expression: Option<String>,
    /// Canonical target type name (string, int, long, double, float, boolean)
    pub target_type: Option<String>,
}

impl FieldMapping {
    pub fn source_path(&self) -> Option<&str> {
        non_blank(self.source_path.as_deref())
    }

    pub fn target_path(&self) -> Option<&str> {
        non_blank(self.target_path.as_deref())
    }

    pub fn transform_expression(&self) -> Option<&str> {
        non_blank(self.transform_expression.as_deref())
    }

    pub fn target_type(&self) -> Option<&str> {
        non_blank(self.target_type.as_deref())
    }

    /// Short `source -> target` label used in diagnostics
    pub fn describe(&self) -> String {
        format!(
            "{} -> {}",
            self.source_path().unwrap_or("<none>"),
            self.target_path().unwrap_or("<none>"),
        )
    }
}

/// Full transformation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformConfig {
    /// JSON text of the final output skeleton; presence selects templated mode
    pub final_json_template: Option<String>,
    /// Mappings applied directly to skeleton fields (sourcePath is ignored)
    pub template_mappings: Vec<FieldMapping>,
    /// JSON text of the per-object output skeleton
    pub target_json: Option<String>,
    /// Path where transformed object(s) are inserted into the skeleton
    pub target_node_path: Option<String>,
    /// Mappings used to build each transformed object
    pub mappings: Vec<FieldMapping>,
}

impl TransformConfig {
    pub fn final_json_template(&self) -> Option<&str> {
        non_blank(self.final_json_template.as_deref())
    }

    pub fn target_json(&self) -> Option<&str> {
        non_blank(self.target_json.as_deref())
    }

    pub fn target_node_path(&self) -> Option<&str> {
        non_blank(self.target_node_path.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
