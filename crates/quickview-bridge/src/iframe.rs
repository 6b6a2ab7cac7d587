//! Iframe side of the bridge.
//!
//! [`IframeRuntime`] owns the embedded document's [`StepEngine`] and is the
//! only code that talks to the parent. It runs one event loop over four
//! inputs: parent messages, delegated DOM events, the scoped mutation
//! observer, and the detection retry timer.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use quickview_config::{Config, EngineConfig};
use quickview_core::{Backoff, EngineEvent, ObservationWindow, Observed, StepEngine};
use quickview_dom::{Document, DomError, DomEvent, DomEventKind, MutationRecord, NodeId, Selector};
use quickview_protocols::{
    FramePort, IframeMessage, InitConfig, MessageEvent, ParentMessage, WireMessage,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::BridgeError;
use crate::links;

const CART_FORM_SELECTOR: &str = "form.cart, .woocommerce-cart-form";
const PRODUCT_FIELD_SELECTOR: &str = "[name=\"add-to-cart\"]";

/// Progress of widget detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// No `init` received yet.
    AwaitingInit,
    /// Still looking after `attempts` empty locates.
    Detecting { attempts: usize },
    Mounted,
    /// Retry budget spent; the widget keeps its own behaviour.
    GaveUp { attempts: usize },
}

pub struct IframeRuntime {
    port: Arc<dyn FramePort>,
    doc: Document,
    engine: StepEngine,
    timing: EngineConfig,
    init: Option<InitConfig>,
    cart_form: Selector,
    product_field: Selector,
    last_height: Option<u32>,
    detection: Arc<RwLock<Detection>>,
}

impl IframeRuntime {
    pub fn new(doc: Document, port: Arc<dyn FramePort>, config: &Config) -> Result<Self, BridgeError> {
        let engine = StepEngine::new(doc.clone(), doc.root(), config)?;
        Ok(Self {
            port,
            engine,
            timing: config.engine.clone(),
            init: None,
            cart_form: Selector::parse(CART_FORM_SELECTOR).map_err(DomError::from)?,
            product_field: Selector::parse(PRODUCT_FIELD_SELECTOR).map_err(DomError::from)?,
            last_height: None,
            detection: Arc::new(RwLock::new(Detection::AwaitingInit)),
            doc,
        })
    }

    pub fn engine(&self) -> &StepEngine {
        &self.engine
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn init_config(&self) -> Option<&InitConfig> {
        self.init.as_ref()
    }

    pub fn detection(&self) -> Detection {
        *self.detection.read()
    }

    /// Apply a message from the parent.
    ///
    /// Returns `true` for the first accepted `init`, which starts detection.
    /// Later `init`s only replace the stored config.
    pub fn handle_message(&mut self, event: &MessageEvent) -> bool {
        if !event.is_from(self.port.origin()) {
            debug!(origin = %event.origin, "dropping message from foreign origin");
            return false;
        }
        let message = match ParentMessage::from_wire(&event.data) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "dropping unrecognized message");
                return false;
            }
        };

        match message {
            ParentMessage::Init { config } => {
                let first = self.init.is_none();
                debug!(home = %config.home, qv_param = %config.qv_param, first, "init received");
                self.init = Some(config);
                first
            }
        }
    }

    pub fn handle_dom_event(&mut self, event: &DomEvent) -> Result<(), BridgeError> {
        match event.kind {
            DomEventKind::Change => {
                let events = self.engine.handle_event(event);
                self.forward(events)
            }
            DomEventKind::Submit => self.on_submit(event.target),
        }
    }

    fn on_submit(&mut self, target: NodeId) -> Result<(), BridgeError> {
        let Some(form) = self.doc.closest(target, &self.cart_form) else {
            trace!("submit outside the cart form");
            return Ok(());
        };
        let product_id = self
            .doc
            .query_selector(form, &self.product_field)
            .and_then(|field| self.doc.value(field))
            .filter(|id| !id.is_empty());
        // A SKU resolved on markup that has since been replaced is stale.
        let current = self.engine.sku().filter(|_| self.engine.is_intact());
        let (sku, path) = match current {
            Some((sku, path)) => (Some(sku.to_string()), Some(path)),
            None => (None, None),
        };

        info!(product_id = ?product_id, sku = ?sku, "add to cart");
        self.post(&IframeMessage::AddToCart {
            product_id,
            sku,
            path,
        })
    }

    /// Locate and initialize unless already mounted.
    pub fn attempt_mount(&mut self) -> Result<bool, BridgeError> {
        if self.engine.is_mounted() {
            return Ok(true);
        }
        match self.engine.try_mount() {
            Some(events) => {
                self.forward(events)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// One detection attempt; the delay before the next one, if any.
    fn detect(&mut self, backoff: &mut Backoff) -> Option<Duration> {
        let attempts = match self.detection() {
            Detection::Detecting { attempts } => attempts + 1,
            _ => 1,
        };
        match self.attempt_mount() {
            Ok(true) => {
                info!(attempts, "configurator mounted");
                return None;
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "detection attempt failed"),
        }

        match backoff.next_delay() {
            Some(delay) => {
                debug!(attempts, delay_ms = delay.as_millis() as u64, "widget not found, retrying");
                *self.detection.write() = Detection::Detecting { attempts };
                Some(delay)
            }
            None => {
                info!(attempts, "widget not found, leaving it as rendered");
                *self.detection.write() = Detection::GaveUp { attempts };
                None
            }
        }
    }

    pub fn handle_observed(&mut self, observed: Observed) -> Result<(), BridgeError> {
        match observed {
            Observed::Mutation(MutationRecord::Resize { height }) => self.report(height),
            Observed::Mutation(_) => {
                let events = self.engine.on_mutation();
                self.forward(events)
            }
            Observed::Lagged(_) => {
                let events = self.engine.on_mutation();
                self.forward(events)?;
                self.report_height()
            }
        }
    }

    /// Post the current content height if it changed.
    pub fn report_height(&mut self) -> Result<(), BridgeError> {
        let height = self.doc.scroll_height();
        self.report(height)
    }

    fn report(&mut self, height: u32) -> Result<(), BridgeError> {
        if self.last_height == Some(height) {
            return Ok(());
        }
        self.last_height = Some(height);
        self.post(&IframeMessage::Resize { height })
    }

    fn forward(&mut self, events: Vec<EngineEvent>) -> Result<(), BridgeError> {
        for event in events {
            let message = match event {
                EngineEvent::Selection(selection) => IframeMessage::CpbSelection { selection },
                EngineEvent::Sku { sku, path } => {
                    if !self.init.as_ref().is_none_or(|init| init.enable_sku_swap) {
                        debug!(sku = %sku, "sku swap disabled");
                        continue;
                    }
                    IframeMessage::SkuSwap { sku, path }
                }
                EngineEvent::Mounted { .. } => {
                    *self.detection.write() = Detection::Mounted;
                    continue;
                }
                _ => continue,
            };
            self.post(&message)?;
        }
        Ok(())
    }

    fn post(&self, message: &IframeMessage) -> Result<(), BridgeError> {
        trace!(action = message.action(), "posting to parent");
        self.port.post_message(message.to_wire()?, self.port.origin())?;
        Ok(())
    }

    /// Same-origin URL for navigation started inside the iframe, keeping the
    /// quick view flag.
    pub fn navigation_url(&self, target: &str) -> Result<String, BridgeError> {
        let init = self.init.as_ref().ok_or(BridgeError::NotInitialized)?;
        let home = Url::parse(&init.home)?;
        let mut url = links::same_origin(&home, target)?;
        links::with_flag(&mut url, &init.qv_param);
        Ok(url.into())
    }

    /// Run the event loop on a new task.
    ///
    /// Listeners are attached before this returns, so messages posted
    /// right after spawning are not missed.
    pub fn spawn(self) -> IframeHandle {
        let shutdown = Arc::new(Notify::new());
        let detection = self.detection.clone();
        let inbound = self.port.subscribe();
        let dom_events = self.doc.subscribe_events();
        let task = tokio::spawn(self.run(inbound, dom_events, shutdown.clone()));
        IframeHandle {
            shutdown,
            detection,
            task,
        }
    }

    /// Event loop; returns the runtime once `shutdown` is notified or the
    /// frame goes away.
    async fn run(
        mut self,
        mut inbound: broadcast::Receiver<MessageEvent>,
        mut dom_events: broadcast::Receiver<DomEvent>,
        shutdown: Arc<Notify>,
    ) -> Self {
        let mut window: Option<ObservationWindow> = None;
        let mut backoff: Option<Backoff> = None;

        let retry_timer = tokio::time::sleep(Duration::ZERO);
        let resize_timer = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(retry_timer, resize_timer);
        let mut retry_armed = false;
        let mut resize_armed = false;

        info!(origin = %self.port.origin(), "iframe runtime started");

        loop {
            let observing = window.as_ref().is_some_and(ObservationWindow::is_active);

            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("iframe runtime shutting down");
                    break;
                }

                // Parent -> iframe
                result = inbound.recv() => match result {
                    Ok(event) => {
                        if !self.handle_message(&event) {
                            continue;
                        }
                        window = Some(ObservationWindow::open(&self.doc, self.timing.observation_window()));
                        resize_timer.as_mut().reset(Instant::now() + self.timing.initial_resize_delay());
                        resize_armed = true;

                        let mut schedule = Backoff::new(self.timing.retry_delays());
                        if let Some(delay) = self.detect(&mut schedule) {
                            retry_timer.as_mut().reset(Instant::now() + delay);
                            retry_armed = true;
                            backoff = Some(schedule);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "parent messages lagged"),
                    Err(RecvError::Closed) => {
                        info!("frame closed");
                        break;
                    }
                },

                // Delegated DOM events
                result = dom_events.recv() => match result {
                    Ok(event) => {
                        if let Err(e) = self.handle_dom_event(&event) {
                            warn!(error = %e, "failed to handle DOM event");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "DOM events lagged"),
                    Err(RecvError::Closed) => break,
                },

                Some(observed) = next_observed(&mut window), if observing => {
                    if let Err(e) = self.handle_observed(observed) {
                        warn!(error = %e, "failed to handle mutation");
                    }
                }

                () = &mut retry_timer, if retry_armed => {
                    retry_armed = false;
                    let next = backoff.as_mut().and_then(|schedule| self.detect(schedule));
                    match next {
                        Some(delay) => {
                            retry_timer.as_mut().reset(Instant::now() + delay);
                            retry_armed = true;
                        }
                        None => backoff = None,
                    }
                }

                () = &mut resize_timer, if resize_armed => {
                    resize_armed = false;
                    if let Err(e) = self.report_height() {
                        warn!(error = %e, "failed to report height");
                    }
                }
            }
        }

        if let Some(window) = window.as_mut() {
            window.teardown();
        }
        self
    }
}

async fn next_observed(window: &mut Option<ObservationWindow>) -> Option<Observed> {
    match window {
        Some(window) => window.next().await,
        None => None,
    }
}

/// Handle to a spawned [`IframeRuntime`].
pub struct IframeHandle {
    shutdown: Arc<Notify>,
    detection: Arc<RwLock<Detection>>,
    task: JoinHandle<IframeRuntime>,
}

impl IframeHandle {
    pub fn detection(&self) -> Detection {
        *self.detection.read()
    }

    /// Stop the loop and take the runtime back.
    pub async fn shutdown(self) -> Result<IframeRuntime, BridgeError> {
        self.shutdown.notify_one();
        self.task
            .await
            .map_err(|e| BridgeError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
#[path = "iframe_tests.rs"]
mod tests;
