//! The outcome record returned by every engine operation

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PathError;

/// HTTP-style status attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// Human-readable message, or the raw checker errors for a schema rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Errors(Vec<String>),
}

impl Message {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(text) => Some(text),
            Message::Errors(_) => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            Message::Errors(errors) => errors,
            Message::Text(_) => &[],
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Errors(errors) => f.write_str(&errors.join("; ")),
        }
    }
}

/// Result of a get/set/delete call.
///
/// Serializes with the field names clients of the built-in context API
/// expect: `valid`, `status`, `msg`, `value`, `obj`.
///
/// `value` is only present on a successful read. `document` is present on
/// every set/delete outcome, and after a failure it is identical to the
/// document as it was before the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult<'a> {
    pub valid: bool,
    /// Absent on a successful read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(rename = "msg")]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a Value>,
    #[serde(rename = "obj", skip_serializing_if = "Option::is_none")]
    pub document: Option<&'a Value>,
}

impl<'a> PathResult<'a> {
    pub(crate) fn found(value: &'a Value) -> Self {
        Self {
            valid: true,
            status: None,
            message: Message::Text("Success".to_string()),
            value: Some(value),
            document: None,
        }
    }

    pub(crate) fn committed(message: &str, document: &'a Value) -> Self {
        Self {
            valid: true,
            status: Some(Status::Ok),
            message: Message::Text(message.to_string()),
            value: None,
            document: Some(document),
        }
    }

    pub(crate) fn with_document(mut self, document: &'a Value) -> Self {
        self.document = Some(document);
        self
    }

    /// Status code as a number, if one was set
    pub fn status_code(&self) -> Option<u16> {
        self.status.map(Status::code)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<PathError> for PathResult<'_> {
    fn from(err: PathError) -> Self {
        let status = err.status();
        let message = match err {
            PathError::SchemaViolation { errors } => Message::Errors(errors),
            other => Message::Text(other.to_string()),
        };
        Self {
            valid: false,
            status: Some(status),
            message,
            value: None,
            document: None,
        }
    }
}
