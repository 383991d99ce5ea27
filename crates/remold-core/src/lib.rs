//! Remold: declarative JSON to JSON transformation
//!
//! Remold restructures JSON documents according to a declarative
//! configuration of field mappings. Each mapping reads a value by path,
//! optionally runs it through a transform expression or a special
//! `@type:command` processor, optionally coerces its type, and writes it by
//! path into the output. A configuration can also supply an output skeleton
//! and a final template that the transformed payload is inserted into.
//!
//! # Example
//!
//! ```
//! use remold_core::{TransformConfig, TransformEngine};
//!
//! let config: TransformConfig = serde_json::from_str(
//!     r#"{
//!         "mappings": [
//!             {"sourcePath": "$.user.name", "targetPath": "$.displayName"},
//!             {"sourcePath": "$.user.age", "targetPath": "$.age", "targetType": "int"}
//!         ]
//!     }"#,
//! )?;
//!
//! let engine = TransformEngine::new(config)?;
//! let output = engine.transform(r#"{"user": {"name": "Ada", "age": "36"}}"#)?;
//!
//! assert_eq!(output["displayName"], "Ada");
//! assert_eq!(output["age"], 36);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::{FieldMapping, TransformConfig};
pub use engine::TransformEngine;
pub use error::{Error, Result};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
