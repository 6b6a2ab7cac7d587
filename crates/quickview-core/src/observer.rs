//! Scoped observation of document mutations.

use std::time::Duration;

use quickview_dom::{Document, MutationRecord};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, warn};

/// What an [`ObservationWindow`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Mutation(MutationRecord),
    /// Records were dropped; the observer should re-check everything.
    Lagged(u64),
}

/// A mutation subscription that tears itself down after a fixed window.
///
/// Bounds long-lived observation when the widget never settles. Once the
/// window closes, [`next`](Self::next) returns `None` forever.
#[derive(Debug)]
pub struct ObservationWindow {
    receiver: Option<broadcast::Receiver<MutationRecord>>,
    deadline: Instant,
}

impl ObservationWindow {
    pub fn open(doc: &Document, window: Duration) -> Self {
        Self {
            receiver: Some(doc.subscribe_mutations()),
            deadline: Instant::now() + window,
        }
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Stop observing and release the subscription.
    pub fn teardown(&mut self) {
        if self.receiver.take().is_some() {
            debug!("observation window closed");
        }
    }

    /// Wait for the next record, or `None` when the window has closed.
    pub async fn next(&mut self) -> Option<Observed> {
        let receiver = self.receiver.as_mut()?;
        match tokio::time::timeout_at(self.deadline, receiver.recv()).await {
            Ok(Ok(record)) => Some(Observed::Mutation(record)),
            Ok(Err(RecvError::Lagged(skipped))) => {
                warn!(skipped, "mutation observer lagged");
                Some(Observed::Lagged(skipped))
            }
            Ok(Err(RecvError::Closed)) | Err(_) => {
                self.teardown();
                None
            }
        }
    }
}
