//! Bridge errors.

use quickview_core::CoreError;
use quickview_dom::DomError;
use quickview_protocols::{FrameError, ProtocolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid quick view target: {0:?}")]
    InvalidTarget(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Refusing cross-origin navigation to {0}")]
    CrossOrigin(String),

    #[error("No init config received yet")]
    NotInitialized,

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Runtime task failed: {0}")]
    TaskFailed(String),
}
