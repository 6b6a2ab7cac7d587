//! Parent side of the bridge: the quick view overlay.

use std::sync::Arc;

use quickview_config::BridgeConfig;
use quickview_protocols::{
    FramePort, IframeMessage, InitConfig, MessageEvent, ParentMessage, Path, SelectionReport,
    WireMessage,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::BridgeError;
use crate::links;

/// Host page integrations notified by the overlay.
///
/// Every method defaults to doing nothing.
pub trait HostHooks: Send + Sync {
    /// Analytics for a step selection.
    fn on_selection(&self, _selection: &SelectionReport) {}

    fn on_sku_swap(&self, _sku: &str, _path: Path) {}

    /// The embedded cart form was submitted.
    fn on_add_to_cart(&self, _product_id: Option<&str>, _sku: Option<&str>, _path: Option<Path>) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl HostHooks for NoopHooks {}

/// Overlay state as the host page would render it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub open: bool,
    /// Current iframe `src`; `None` while closed.
    pub src: Option<String>,
    /// Height reported by the iframe.
    pub iframe_height: Option<u32>,
    /// Page scrolling is disabled while the overlay is open.
    pub scroll_locked: bool,
}

pub struct ModalController {
    port: Arc<dyn FramePort>,
    config: BridgeConfig,
    hooks: Arc<dyn HostHooks>,
    state: ModalState,
    last_sku: Option<(String, Path)>,
}

impl ModalController {
    pub fn new(port: Arc<dyn FramePort>, config: BridgeConfig, hooks: Arc<dyn HostHooks>) -> Self {
        Self {
            port,
            config,
            hooks,
            state: ModalState::default(),
            last_sku: None,
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    /// Last SKU the iframe swapped to, with its path.
    pub fn last_sku(&self) -> Option<(&str, Path)> {
        self.last_sku.as_ref().map(|(sku, path)| (sku.as_str(), *path))
    }

    /// Build the iframe URL for a product URL or numeric post id.
    pub fn iframe_url(&self, target: &str) -> Result<String, BridgeError> {
        let home = Url::parse(&self.config.home)?;
        let mut url = links::resolve_target(&home, target)?;
        let param = if url.as_str().contains("staging") {
            &self.config.staging_param
        } else {
            &self.config.qv_param
        };
        links::with_flag(&mut url, param);
        Ok(url.into())
    }

    /// Show the overlay with `target` loaded in the iframe.
    pub fn open(&mut self, target: &str) -> Result<&str, BridgeError> {
        let src = self.iframe_url(target)?;
        info!(src = %src, "opening quick view");
        self.state = ModalState {
            open: true,
            src: Some(src),
            iframe_height: None,
            scroll_locked: true,
        };
        Ok(self.state.src.as_deref().unwrap_or_default())
    }

    pub fn close(&mut self) {
        if self.state.open {
            info!("closing quick view");
        }
        self.state = ModalState::default();
    }

    /// The configuration handed to the iframe on load.
    pub fn init_config(&self) -> InitConfig {
        InitConfig {
            home: self.config.home.clone(),
            qv_param: self.config.qv_param.clone(),
            enable_sku_swap: self.config.enable_sku_swap,
            enable_analytics: self.config.enable_analytics,
        }
    }

    /// Called on every iframe `load`; sends one `init` while open.
    pub fn on_iframe_load(&self) -> Result<bool, BridgeError> {
        if !self.state.open {
            debug!("iframe loaded while closed, no init sent");
            return Ok(false);
        }
        let message = ParentMessage::Init {
            config: self.init_config(),
        };
        self.port.post_message(message.to_wire()?, self.port.origin())?;
        debug!("init sent");
        Ok(true)
    }

    /// Apply a message from the iframe; `None` when it was dropped.
    pub fn handle_message(&mut self, event: &MessageEvent) -> Option<IframeMessage> {
        if !event.is_from(self.port.origin()) {
            debug!(origin = %event.origin, "dropping message from foreign origin");
            return None;
        }
        let message = match IframeMessage::from_wire(&event.data) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "dropping unrecognized message");
                return None;
            }
        };

        match &message {
            IframeMessage::Resize { height } => {
                debug!(height, "iframe resized");
                self.state.iframe_height = Some(*height);
            }
            IframeMessage::CpbSelection { selection } => {
                if self.config.enable_analytics {
                    self.hooks.on_selection(selection);
                }
            }
            IframeMessage::SkuSwap { sku, path } => {
                info!(sku = %sku, path = %path, "sku swapped");
                self.last_sku = Some((sku.clone(), *path));
                self.hooks.on_sku_swap(sku, *path);
            }
            IframeMessage::AddToCart {
                product_id,
                sku,
                path,
            } => {
                info!(product_id = ?product_id, sku = ?sku, "add to cart requested");
                self.hooks
                    .on_add_to_cart(product_id.as_deref(), sku.as_deref(), *path);
            }
        }
        Some(message)
    }

    /// Wait for the next accepted message; `None` once the frame is gone.
    pub async fn recv(
        &mut self,
        inbox: &mut broadcast::Receiver<MessageEvent>,
    ) -> Option<IframeMessage> {
        loop {
            match inbox.recv().await {
                Ok(event) => {
                    if let Some(message) = self.handle_message(&event) {
                        return Some(message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "iframe messages lagged"),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Apply every message already delivered.
    pub fn drain(&mut self, inbox: &mut broadcast::Receiver<MessageEvent>) -> Vec<IframeMessage> {
        let mut accepted = Vec::new();
        loop {
            match inbox.try_recv() {
                Ok(event) => accepted.extend(self.handle_message(&event)),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "iframe messages lagged");
                }
                Err(_) => return accepted,
            }
        }
    }
}
