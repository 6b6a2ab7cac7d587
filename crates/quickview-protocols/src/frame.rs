//! Frame port protocol.
//!
//! A [`FramePort`] is one document's `postMessage` endpoint. Messages are
//! structured JSON; the receiver learns the sender's origin from the
//! [`MessageEvent`] and must check it itself.

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::FrameError;

/// A message delivered to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    /// Origin of the sending document.
    pub origin: String,
    pub data: Value,
}

impl MessageEvent {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    /// Whether the sender shares the receiver's origin.
    pub fn is_from(&self, origin: &str) -> bool {
        self.origin == origin
    }
}

/// One side of a frame boundary.
///
/// Delivery preserves send order per port.
pub trait FramePort: Send + Sync {
    /// Origin of the document owning this port.
    fn origin(&self) -> &str;

    /// Post a message to the other side. Delivery is skipped silently when
    /// `target_origin` does not match the receiver, as browsers do.
    fn post_message(&self, data: Value, target_origin: &str) -> Result<(), FrameError>;

    /// Receive messages addressed to this document.
    fn subscribe(&self) -> broadcast::Receiver<MessageEvent>;
}
