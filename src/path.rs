//! Dot-path syntax
//!
//! A path such as `profile.address.city` names a location in the built-in
//! context. Only ASCII letters, digits, `@` and the `.` separator are
//! accepted; there is no escaping, so a segment can never contain a dot.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::PathError;

/// Characters allowed anywhere in a path string
const PATH_PATTERN: &str = r"^[a-zA-Z0-9@.]+$";

fn path_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PATH_PATTERN).expect("path pattern is a valid regex"))
}

/// A syntactically valid path, split into its segments.
///
/// Always holds at least one segment and no segment is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

/// Check a path string and split it into segments.
///
/// Empty segments (`a..b`, `.a`, `a.`) are rejected along with illegal
/// characters, before any document is touched.
pub fn validate_path(path: &str) -> Result<FieldPath, PathError> {
    if !path_regex().is_match(path) {
        return Err(PathError::InvalidFormat);
    }

    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(PathError::InvalidFormat);
    }

    Ok(FieldPath { segments })
}

impl FieldPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments leading to the container that holds the last one
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The name of the property the path points at
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Dot-joined segments `0..=index`, used to report where a walk stopped
    pub fn prefix(&self, index: usize) -> String {
        let end = (index + 1).min(self.segments.len());
        self.segments[..end].join(".")
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_path(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_alphanumeric_and_at() {
        let path = validate_path("user@home.Address2.city").unwrap();
        assert_eq!(path.segments(), ["user@home", "Address2", "city"]);
        assert_eq!(path.leaf(), "city");
        assert_eq!(path.parent_segments(), ["user@home", "Address2"]);
        assert_eq!(path.to_string(), "user@home.Address2.city");
    }

    #[test]
    fn test_single_segment_has_no_parents() {
        let path: FieldPath = "name".parse().unwrap();
        assert_eq!(path.len(), 1);
        assert!(path.parent_segments().is_empty());
    }

    #[test]
    fn test_rejects_illegal_characters() {
        for bad in ["", "a b", "a-b", "a/b", "a.b[0]", "a.*", "ünicode", "a_b"] {
            assert_eq!(validate_path(bad), Err(PathError::InvalidFormat), "{bad:?}");
        }
    }

    #[test]
    fn test_rejects_empty_segments() {
        for bad in ["a..b", ".a", "a.", "."] {
            assert_eq!(validate_path(bad), Err(PathError::InvalidFormat), "{bad:?}");
        }
    }

    #[test]
    fn test_prefix_includes_failing_segment() {
        let path = validate_path("a.b.c").unwrap();
        assert_eq!(path.prefix(0), "a");
        assert_eq!(path.prefix(1), "a.b");
        assert_eq!(path.prefix(2), "a.b.c");
    }
}
