//! Error types for the admin controllers

use thiserror::Error;

/// Result type alias using the crate's error type
pub type Result<T> = std::result::Result<T, AdminError>;

/// Failure reported by a [`RemoteCollection`](crate::remote::RemoteCollection)
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not the JSON we expected
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Builds a status error with an `HTTP <code>: <body>` message
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        };
        TransportError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}

/// Errors surfaced by list, form and drill-down operations
#[derive(Debug, Error)]
pub enum AdminError {
    // ─────────────────────────────────────────────────────────────
    // Remote errors
    // ─────────────────────────────────────────────────────────────
    #[error("Request failed: {0}")]
    Transport(#[from] TransportError),

    /// A record could not be fetched for editing; the form stays closed
    #[error("Could not load record: {0}")]
    Load(TransportError),

    // ─────────────────────────────────────────────────────────────
    // Local precondition errors (no request sent)
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Validation(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("No delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("The form is not open")]
    NotEditing,

    // ─────────────────────────────────────────────────────────────
    // Configuration errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdminError {
    /// The underlying transport failure, if any
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            AdminError::Transport(err) | AdminError::Load(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_body() {
        let err = TransportError::from_status(400, " Passport expired \n");
        assert_eq!(err.to_string(), "HTTP 400: Passport expired");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn status_message_without_body() {
        let err = TransportError::from_status(503, "");
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[test]
    fn load_error_exposes_transport() {
        let err = AdminError::Load(TransportError::Network("refused".into()));
        assert_eq!(
            err.transport(),
            Some(&TransportError::Network("refused".into()))
        );
        assert!(!err.is_validation());
    }
}
