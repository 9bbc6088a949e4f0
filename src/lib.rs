//! Built-in Context Path Engine
//!
//! Dot-path read, write and delete access into a user's built-in context
//! document, keeping the document conformant to a fixed JSON Schema.
//!
//! ## Features
//!
//! - **Path Validation**: Paths are checked against `[A-Za-z0-9@.]+` before
//!   any document access
//! - **Precise Misses**: Failed lookups name the deepest path prefix tried
//! - **Transactional Writes**: Every set/delete is re-validated against the
//!   whole schema and rolled back if the document stops conforming
//! - **Pluggable Checker**: Any [`ConformanceChecker`] can gate mutations;
//!   [`SchemaGate`] uses JSON Schema
//!
//! ## Example
//!
//! ```rust
//! use builtin_context::{BuiltinContext, SchemaGate};
//! use serde_json::json;
//!
//! let gate = SchemaGate::new(json!({
//!     "type": "object",
//!     "properties": {
//!         "a": { "type": "object", "properties": { "b": { "type": "number" } } }
//!     }
//! })).unwrap();
//! let engine = BuiltinContext::new(gate);
//!
//! let mut doc = json!({"a": {"b": 1}});
//! assert!(engine.set(&mut doc, "a.b", json!(2)).valid);
//! assert!(!engine.set(&mut doc, "a.b", json!("x")).valid);
//! assert_eq!(engine.get(&doc, "a.b").value, Some(&json!(2)));
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod mutator;
pub mod path;
pub mod resolve;
pub mod result;

pub use config::{ContextConfig, MutationMode};
pub use error::{ContextError, PathError, Result};
pub use gate::{Conformance, ConformanceChecker, SchemaGate};
pub use mutator::BuiltinContext;
pub use path::{validate_path, FieldPath};
pub use resolve::{resolve, resolve_parent_mut};
pub use result::{Message, PathResult, Status};
