//! User-facing copy for failed operations.
//!
//! Server validation failures arrive as free text inside a transport error.
//! A short table maps recognised phrases to friendlier wording; anything
//! else falls back to a generic message for the operation.

use crate::error::{AdminError, TransportError};

/// Recognised server phrase (matched case-insensitively) and its display copy
pub struct KnownPhrase {
    pub phrase: &'static str,
    pub display: &'static str,
}

/// Phrases the booking backend is known to return
pub const KNOWN_PHRASES: &[KnownPhrase] = &[
    KnownPhrase {
        phrase: "passport expired",
        display: "The passport has expired. Enter a valid passport expiry date.",
    },
    KnownPhrase {
        phrase: "passport has expired",
        display: "The passport has expired. Enter a valid passport expiry date.",
    },
    KnownPhrase {
        phrase: "invalid age",
        display: "The passenger's date of birth gives an invalid age for travel.",
    },
    KnownPhrase {
        phrase: "flight not found",
        display: "The selected flight does not exist. Check the flight id.",
    },
    KnownPhrase {
        phrase: "flight does not exist",
        display: "The selected flight does not exist. Check the flight id.",
    },
];

/// Operation being reported on, used for the fallback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Delete,
    LoadChildren,
}

/// Looks up friendlier copy for a server message
pub fn friendly(message: &str) -> Option<&'static str> {
    let message = message.to_lowercase();
    KNOWN_PHRASES
        .iter()
        .find(|known| message.contains(known.phrase))
        .map(|known| known.display)
}

/// Generic failure copy, e.g. "Failed to save passenger."
pub fn fallback(operation: Operation, label: &str, plural: &str) -> String {
    match operation {
        Operation::Load => format!("Failed to load {}.", plural),
        Operation::Save => format!("Failed to save {}.", label),
        Operation::Delete => format!("Failed to delete {}.", label),
        Operation::LoadChildren => format!("Failed to load {}.", plural),
    }
}

/// Message shown for a transport failure
pub fn for_transport(
    err: &TransportError,
    operation: Operation,
    label: &str,
    plural: &str,
) -> String {
    match err {
        TransportError::Status { message, .. } => friendly(message)
            .map(str::to_string)
            .unwrap_or_else(|| fallback(operation, label, plural)),
        _ => fallback(operation, label, plural),
    }
}

/// Message shown for any operation error; local errors keep their own text
pub fn for_error(err: &AdminError, operation: Operation, label: &str, plural: &str) -> String {
    match err.transport() {
        Some(transport) => for_transport(transport, operation, label, plural),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_phrases_map_case_insensitively() {
        let err = TransportError::from_status(400, "Validation failed: Passport EXPIRED");
        let text = for_transport(&err, Operation::Save, "passenger", "passengers");
        assert!(text.starts_with("The passport has expired"));

        let err = TransportError::from_status(404, "Flight not found with id 9");
        let text = for_transport(&err, Operation::Save, "passenger", "passengers");
        assert!(text.contains("does not exist"));

        assert!(friendly("invalid age for passenger").is_some());
    }

    #[test]
    fn unknown_status_falls_back() {
        let err = TransportError::from_status(500, "NullPointerException");
        assert_eq!(
            for_transport(&err, Operation::Save, "flight", "flights"),
            "Failed to save flight."
        );
    }

    #[test]
    fn network_failures_use_generic_copy() {
        let err = TransportError::Network("connection refused".into());
        assert_eq!(
            for_transport(&err, Operation::Load, "flight", "flights"),
            "Failed to load flights."
        );
        assert_eq!(
            for_transport(&err, Operation::Delete, "passenger", "passengers"),
            "Failed to delete passenger."
        );
    }

    #[test]
    fn validation_errors_keep_their_text() {
        let err = AdminError::Validation("First name is required.".into());
        assert_eq!(
            for_error(&err, Operation::Save, "passenger", "passengers"),
            "First name is required."
        );
    }
}
