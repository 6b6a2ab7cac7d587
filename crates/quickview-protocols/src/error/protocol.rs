//! Envelope decoding errors.

use thiserror::Error;

/// Errors raised while decoding a message envelope.
///
/// Receivers treat every variant as "ignore this message".
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Message has no type discriminator")]
    MissingType,

    #[error("Unexpected message type: {0}")]
    UnexpectedType(String),

    #[error("Message has no action")]
    MissingAction,

    #[error("Unrecognized action: {0}")]
    UnrecognizedAction(String),

    #[error("Malformed payload for action {action}: {message}")]
    MalformedPayload { action: String, message: String },

    #[error("Invalid selection key: {0}")]
    InvalidSelectionKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_type_error() {
        let err = ProtocolError::UnexpectedType("other".to_string());
        assert!(err.to_string().contains("other"));
    }

    #[test]
    fn test_malformed_payload_error() {
        let err = ProtocolError::MalformedPayload {
            action: "resize".to_string(),
            message: "missing field `height`".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("resize"));
        assert!(display.contains("height"));
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ProtocolError::from(json_err);
        assert!(err.to_string().contains("Serialization error"));
    }
}
