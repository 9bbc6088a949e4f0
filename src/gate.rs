//! Schema conformance gate
//!
//! The engine never decides on its own whether a document is acceptable: it
//! asks a [`ConformanceChecker`] about the whole document after each
//! mutation. [`SchemaGate`] is the JSON Schema backed implementation.

use std::fs;
use std::path::Path;

use jsonschema::{ErrorIterator, JSONSchema};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ContextError, Result};

/// Verdict of a conformance check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conformance {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Conformance {
    pub fn conformant() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn violations(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Whole-document conformance check.
///
/// Implementations must be pure: the same document always gets the same
/// verdict, and the document is never modified. The engine hands
/// `errors` to the caller exactly as returned; their wording is owned by
/// the checker.
pub trait ConformanceChecker {
    fn check(&self, document: &Value) -> Conformance;
}

impl<F> ConformanceChecker for F
where
    F: Fn(&Value) -> Conformance,
{
    fn check(&self, document: &Value) -> Conformance {
        self(document)
    }
}

/// Checker backed by a compiled JSON Schema.
///
/// Each error is `"<instance pointer>: <validator message>"`, or just the
/// validator message when the violation is at the document root. The
/// validator message itself is not altered.
pub struct SchemaGate {
    schema: Value,
    compiled: JSONSchema,
}

impl SchemaGate {
    /// Compile a schema; the draft is taken from its `$schema` keyword
    pub fn new(schema: Value) -> Result<Self> {
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| ContextError::InvalidSchema(e.to_string()))?;
        Ok(Self { schema, compiled })
    }

    /// Load and compile a schema from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let schema: Value = serde_json::from_str(&content)?;
        Self::new(schema)
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl std::fmt::Debug for SchemaGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaGate").field("schema", &self.schema).finish()
    }
}

impl ConformanceChecker for SchemaGate {
    fn check(&self, document: &Value) -> Conformance {
        match self.compiled.validate(document) {
            Ok(()) => Conformance::conformant(),
            Err(errors) => Conformance::violations(describe(errors)),
        }
    }
}

/// One line per violation, prefixed with the JSON pointer of the offending
/// value unless it is the document root.
fn describe(errors: ErrorIterator<'_>) -> Vec<String> {
    errors
        .map(|error| {
            let pointer = error.instance_path.to_string();
            if pointer.is_empty() {
                error.to_string()
            } else {
                format!("{}: {}", pointer, error)
            }
        })
        .collect()
}
