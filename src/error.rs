//! Error types
//!
//! Every handler either succeeds or returns the first [`Error`] it hit.
//! Nothing is retried or downgraded above the HTTP layer.

use std::fmt;

use reqwest::StatusCode;

/// Result alias used across the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A single configuration problem, tied to the attribute it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Attribute path, e.g. `events`.
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected before any request was made.
    #[error("invalid configuration: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// A value could not be written into the schema-data handle.
    #[error("attribute {name}: {message}")]
    Attribute { name: String, message: String },

    /// The API answered with a non-success status.
    #[error("API request to {url} failed: {status}")]
    Api {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("operation cancelled")]
    Cancelled,

    /// A success response that does not name the remote object.
    #[error("{action} response carried no identifier")]
    MissingId { action: String },

    #[error("cannot {action} a resource in state {state}")]
    InvalidTransition { action: String, state: String },

    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn attribute(name: &str, message: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// True when the remote side reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Field errors of a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = Error::Validation(vec![
            FieldError::new("events", "bad value"),
            FieldError::new("name", "required attribute is missing"),
        ]);
        let message = err.to_string();
        assert!(message.contains("events: bad value"));
        assert!(message.contains("name: required attribute is missing"));
    }

    #[test]
    fn test_not_found_detection() {
        let err = Error::Api {
            status: StatusCode::NOT_FOUND,
            url: "https://portal.frontegg.com/frontegg/webhook/abc".to_string(),
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!Error::Cancelled.is_not_found());
    }

    #[test]
    fn test_missing_id_is_not_a_not_found() {
        let err = Error::MissingId {
            action: "create".to_string(),
        };
        assert_eq!(err.to_string(), "create response carried no identifier");
        assert!(!err.is_not_found());
    }
}
