//! Walking a document along a [`FieldPath`]
//!
//! Reads and writes report a missing segment differently: a read that
//! misses is a bad request against the full path (400), while a write whose
//! ancestor is missing targets a location that does not exist yet (404).

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::PathError;
use crate::path::FieldPath;

/// Error for a walk that needs to descend from `segments[index - 1]`,
/// which is not an object.
fn not_a_container(path: &FieldPath, index: usize) -> PathError {
    if index == 0 {
        PathError::RootNotAnObject
    } else {
        PathError::NotAContainer {
            path: path.prefix(index - 1),
        }
    }
}

/// Resolve the full path for reading.
pub fn resolve<'a>(document: &'a Value, path: &FieldPath) -> Result<&'a Value, PathError> {
    let mut current = document;

    for (index, segment) in path.segments().iter().enumerate() {
        let object = current
            .as_object()
            .ok_or_else(|| not_a_container(path, index))?;

        current = match object.get(segment) {
            Some(child) => child,
            None => {
                let missing = path.prefix(index);
                debug!(path = %path, missing = %missing, "read path does not resolve");
                return Err(PathError::NotFound { path: missing });
            }
        };
    }

    Ok(current)
}

/// Resolve the container that holds the last segment of `path`.
///
/// Only the ancestors are walked; whether the leaf itself exists is left to
/// the caller.
pub fn resolve_parent_mut<'a>(
    document: &'a mut Value,
    path: &FieldPath,
) -> Result<&'a mut Map<String, Value>, PathError> {
    let mut current = document;

    for (index, segment) in path.parent_segments().iter().enumerate() {
        let object = current
            .as_object_mut()
            .ok_or_else(|| not_a_container(path, index))?;

        current = match object.get_mut(segment) {
            Some(child) => child,
            None => {
                let missing = path.prefix(index);
                debug!(path = %path, missing = %missing, "parent path does not resolve");
                return Err(PathError::AncestorNotFound { path: missing });
            }
        };
    }

    let depth = path.parent_segments().len();
    current
        .as_object_mut()
        .ok_or_else(|| not_a_container(path, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::validate_path;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        validate_path(s).unwrap()
    }

    #[test]
    fn test_resolve_leaf_and_subtree() {
        let doc = json!({"a": {"b": 1, "c": {"d": null}}});
        assert_eq!(resolve(&doc, &path("a.b")).unwrap(), &json!(1));
        assert_eq!(resolve(&doc, &path("a.c")).unwrap(), &json!({"d": null}));
        assert_eq!(resolve(&doc, &path("a.c.d")).unwrap(), &Value::Null);
    }

    #[test]
    fn test_resolve_reports_first_missing_prefix() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(
            resolve(&doc, &path("a.c")),
            Err(PathError::NotFound { path: "a.c".into() })
        );
        assert_eq!(
            resolve(&doc, &path("x.y.z")),
            Err(PathError::NotFound { path: "x".into() })
        );
    }

    #[test]
    fn test_resolve_through_scalar_is_typed_error() {
        let doc = json!({"a": {"b": 1, "list": [1, 2]}});
        assert_eq!(
            resolve(&doc, &path("a.b.c")),
            Err(PathError::NotAContainer { path: "a.b".into() })
        );
        assert_eq!(
            resolve(&doc, &path("a.list.0")),
            Err(PathError::NotAContainer { path: "a.list".into() })
        );
        assert_eq!(resolve(&json!(3), &path("a")), Err(PathError::RootNotAnObject));
    }

    #[test]
    fn test_parent_of_single_segment_is_root() {
        let mut doc = json!({"a": 1});
        let parent = resolve_parent_mut(&mut doc, &path("z")).unwrap();
        assert!(parent.contains_key("a"));
        assert!(!parent.contains_key("z"));
    }

    #[test]
    fn test_parent_does_not_require_leaf() {
        let mut doc = json!({"a": {"b": {}}});
        let parent = resolve_parent_mut(&mut doc, &path("a.b.new")).unwrap();
        parent.insert("new".into(), json!(true));
        assert_eq!(doc, json!({"a": {"b": {"new": true}}}));
    }

    #[test]
    fn test_parent_miss_is_not_found() {
        let mut doc = json!({"a": {"b": 1}});
        assert_eq!(
            resolve_parent_mut(&mut doc, &path("a.x.y.z")),
            Err(PathError::AncestorNotFound { path: "a.x".into() })
        );
    }

    #[test]
    fn test_parent_that_is_scalar_is_rejected() {
        let mut doc = json!({"a": {"b": 1}});
        assert_eq!(
            resolve_parent_mut(&mut doc, &path("a.b.c")),
            Err(PathError::NotAContainer { path: "a.b".into() })
        );
        assert_eq!(
            resolve_parent_mut(&mut doc, &path("a.b.c.d")),
            Err(PathError::NotAContainer { path: "a.b".into() })
        );
        assert_eq!(
            resolve_parent_mut(&mut json!("text"), &path("a")),
            Err(PathError::RootNotAnObject)
        );
    }
}
