//! In-process window pair with `postMessage` delivery rules.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quickview_protocols::{FrameError, FramePort, MessageEvent};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace};

const INBOX_CAPACITY: usize = 256;

/// Wildcard target origin.
pub const ANY_ORIGIN: &str = "*";

/// One document's message endpoint, linked to exactly one peer.
///
/// Delivery follows the browser: a message whose target origin does not
/// match the receiving document is dropped without an error, and the
/// receiver learns the sender's origin from the event.
#[derive(Debug, Clone)]
pub struct Window {
    origin: String,
    inbox: broadcast::Sender<MessageEvent>,
    peer_origin: String,
    peer_inbox: broadcast::Sender<MessageEvent>,
    closed: Arc<AtomicBool>,
}

/// Create a linked parent/iframe pair.
pub fn window_pair(parent_origin: &str, iframe_origin: &str) -> (Window, Window) {
    let (parent_inbox, _) = broadcast::channel(INBOX_CAPACITY);
    let (iframe_inbox, _) = broadcast::channel(INBOX_CAPACITY);
    let closed = Arc::new(AtomicBool::new(false));

    let parent = Window {
        origin: parent_origin.to_string(),
        inbox: parent_inbox.clone(),
        peer_origin: iframe_origin.to_string(),
        peer_inbox: iframe_inbox.clone(),
        closed: closed.clone(),
    };
    let iframe = Window {
        origin: iframe_origin.to_string(),
        inbox: iframe_inbox,
        peer_origin: parent_origin.to_string(),
        peer_inbox: parent_inbox,
        closed,
    };
    (parent, iframe)
}

impl Window {
    pub fn peer_origin(&self) -> &str {
        &self.peer_origin
    }

    /// Deliver an event as if some other frame had posted it here.
    pub fn deliver(&self, event: MessageEvent) {
        let _ = self.inbox.send(event);
    }

    /// Tear down the link; later posts from either side fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl FramePort for Window {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn post_message(&self, data: Value, target_origin: &str) -> Result<(), FrameError> {
        if self.is_closed() {
            return Err(FrameError::Disconnected);
        }
        if target_origin != ANY_ORIGIN && target_origin != self.peer_origin {
            debug!(
                target_origin,
                receiver = %self.peer_origin,
                "target origin mismatch, message not delivered"
            );
            return Ok(());
        }
        trace!(from = %self.origin, "posting message");
        // A document with no listener simply drops the message.
        let _ = self.peer_inbox.send(MessageEvent::new(self.origin.clone(), data));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.inbox.subscribe()
    }
}
