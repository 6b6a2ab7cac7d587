//! # Quick View Protocols
//!
//! Shared definitions for both sides of the quick view frame boundary.
//! Contains only types and traits - no DOM or runtime behaviour.
//!
//! ## Contents
//!
//! - [`IframeMessage`] / [`ParentMessage`] - the `tpb-qv` and `tpb-qv-config` envelopes
//! - [`WireMessage`] - JSON encoding with the `type` discriminator
//! - [`FramePort`] - a `postMessage` endpoint owned by one document
//! - [`SelectionState`], [`StepRole`], [`Path`] - configuration vocabulary

pub mod error;
pub mod frame;
pub mod message;
pub mod types;

pub use error::{FrameError, ProtocolError};
pub use frame::{FramePort, MessageEvent};
pub use message::{
    IframeMessage, InitConfig, ParentMessage, SelectionReport, WireMessage,
    IFRAME_MESSAGE_TYPE, PARENT_MESSAGE_TYPE,
};
pub use types::*;
