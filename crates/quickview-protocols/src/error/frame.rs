//! Frame port errors.

use thiserror::Error;

use super::ProtocolError;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame disconnected")]
    Disconnected,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        assert_eq!(FrameError::Disconnected.to_string(), "Frame disconnected");
    }

    #[test]
    fn test_protocol_error_from() {
        let err = FrameError::from(ProtocolError::MissingType);
        assert!(err.to_string().contains("Protocol error"));
    }
}
