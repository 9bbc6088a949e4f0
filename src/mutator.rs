//! Transactional get/set/delete on a built-in context document
//!
//! Each set or delete is all-or-nothing: the change is applied in place, the
//! whole document is re-checked, and on a failed check the previous value is
//! put back before the call returns. Lifecycle of a mutation:
//!
//! ```text
//! Start -> SyntaxChecked -> ParentResolved -> Mutated -> Committed
//!                                                     \-> RolledBack
//! ```
//!
//! Failures before `Mutated` never touch the document.

use std::mem;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{ContextConfig, MutationMode};
use crate::error::{ContextError, PathError, Result};
use crate::gate::{Conformance, ConformanceChecker, SchemaGate};
use crate::path::{validate_path, FieldPath};
use crate::resolve::{resolve, resolve_parent_mut};
use crate::result::PathResult;

const UPDATED: &str = "Successfully updated property";
const DELETED: &str = "Successfully deleted property";

/// What was at the mutation target before the change
#[derive(Debug)]
enum Snapshot {
    Existed(Value),
    Absent,
}

impl Snapshot {
    /// Put the container back the way it was
    fn restore(self, parent: &mut Map<String, Value>, leaf: &str) {
        match self {
            Snapshot::Existed(previous) => match parent.get_mut(leaf) {
                Some(slot) => *slot = previous,
                None => {
                    parent.insert(leaf.to_string(), previous);
                }
            },
            Snapshot::Absent => {
                parent.remove(leaf);
            }
        }
    }
}

/// Path access engine for built-in context documents.
///
/// The engine holds the checker and the mutation settings; documents are
/// passed to every call and mutated in place.
#[derive(Debug)]
pub struct BuiltinContext<C = SchemaGate> {
    checker: C,
    mode: MutationMode,
    leaf_value_field: String,
}

impl BuiltinContext<SchemaGate> {
    /// Load configuration (see [`ContextConfig::load_from`]) and build an engine
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = ContextConfig::load_from(config_path)?;
        Self::from_config(&config)
    }

    /// Build an engine from configuration, loading the schema it names
    pub fn from_config(config: &ContextConfig) -> Result<Self> {
        let schema_path = config.schema_path().ok_or(ContextError::MissingSchema)?;
        let gate = SchemaGate::from_file(&schema_path)?;
        debug!(
            schema = %schema_path.display(),
            mode = ?config.mutation.mode,
            "loaded built-in context schema"
        );

        Ok(Self::new(gate)
            .with_mode(config.mutation.mode)
            .with_leaf_value_field(config.mutation.leaf_value_field.clone()))
    }
}

impl<C: ConformanceChecker> BuiltinContext<C> {
    /// Strict engine using `checker`, unwrapping `leafValue`
    pub fn new(checker: C) -> Self {
        Self {
            checker,
            mode: MutationMode::Strict,
            leaf_value_field: "leafValue".to_string(),
        }
    }

    pub fn with_mode(mut self, mode: MutationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_leaf_value_field(mut self, field: impl Into<String>) -> Self {
        self.leaf_value_field = field.into();
        self
    }

    pub fn mode(&self) -> MutationMode {
        self.mode
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    /// Check a whole document against the schema
    pub fn validate(&self, document: &Value) -> Conformance {
        self.checker.check(document)
    }

    /// Read the value at `path`
    pub fn get<'a>(&self, document: &'a Value, path: &str) -> PathResult<'a> {
        match self.try_get(document, path) {
            Ok(value) => PathResult::found(value),
            Err(err) => err.into(),
        }
    }

    /// Set the value at `path`, rolling back if the document stops conforming
    pub fn set<'a>(&self, document: &'a mut Value, path: &str, value: Value) -> PathResult<'a> {
        match self.try_set(document, path, value) {
            Ok(()) => PathResult::committed(UPDATED, document),
            Err(err) => PathResult::from(err).with_document(document),
        }
    }

    /// Delete the property at `path`, restoring it if the document stops conforming
    pub fn delete<'a>(&self, document: &'a mut Value, path: &str) -> PathResult<'a> {
        match self.try_delete(document, path) {
            Ok(()) => PathResult::committed(DELETED, document),
            Err(err) => PathResult::from(err).with_document(document),
        }
    }

    pub fn try_get<'a>(
        &self,
        document: &'a Value,
        path: &str,
    ) -> std::result::Result<&'a Value, PathError> {
        let path = validate_path(path)?;
        resolve(document, &path)
    }

    pub fn try_set(
        &self,
        document: &mut Value,
        path: &str,
        value: Value,
    ) -> std::result::Result<(), PathError> {
        let path = validate_path(path)?;
        let parent = resolve_parent_mut(document, &path)?;
        let value = self.effective_value(value);

        let snapshot = match parent.get_mut(path.leaf()) {
            Some(slot) => Snapshot::Existed(mem::replace(slot, value)),
            None => {
                parent.insert(path.leaf().to_string(), value);
                Snapshot::Absent
            }
        };

        self.commit_or_rollback(document, &path, snapshot)
    }

    pub fn try_delete(
        &self,
        document: &mut Value,
        path: &str,
    ) -> std::result::Result<(), PathError> {
        let path = validate_path(path)?;
        let parent = resolve_parent_mut(document, &path)?;

        let previous = parent.remove(path.leaf()).ok_or_else(|| {
            debug!(path = %path, "delete target does not exist");
            PathError::LeafNotFound
        })?;

        self.commit_or_rollback(document, &path, Snapshot::Existed(previous))
    }

    /// Store the wrapped leaf instead of a `{"leafValue": ...}` wrapper
    fn effective_value(&self, value: Value) -> Value {
        match value {
            Value::Object(mut map) => match map.remove(&self.leaf_value_field) {
                Some(leaf) => leaf,
                None => Value::Object(map),
            },
            other => other,
        }
    }

    fn commit_or_rollback(
        &self,
        document: &mut Value,
        path: &FieldPath,
        snapshot: Snapshot,
    ) -> std::result::Result<(), PathError> {
        if self.mode == MutationMode::Permissive {
            debug!(path = %path, "applied without schema check");
            return Ok(());
        }

        let verdict = self.checker.check(document);
        if verdict.valid {
            debug!(path = %path, "committed");
            return Ok(());
        }

        warn!(path = %path, errors = verdict.errors.len(), "schema rejected change, rolling back");
        // Ancestors are untouched by the mutation, so the walk resolves again.
        let parent = resolve_parent_mut(document, path)?;
        snapshot.restore(parent, path.leaf());

        Err(PathError::SchemaViolation {
            errors: verdict.errors,
        })
    }
}
