//! Scripted end-to-end runs across the frame boundary.
//!
//! A [`Scenario`] mounts a widget in an in-process iframe document, opens
//! the overlay, performs user actions, and collects every message the
//! parent accepted.
//!
//! ```json
//! {
//!   "open": "1234",
//!   "widget": { "tag": "form", "attrs": { "class": "cart" }, "children": [] },
//!   "steps": [
//!     { "action": "choose", "select": "select[name=count]", "option": "16" },
//!     { "action": "check", "label": "Pre-designed" },
//!     { "action": "submit" }
//!   ]
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use quickview_config::Config;
use quickview_dom::{Document, ElementSpec, NodeId};
use quickview_protocols::{FramePort, IframeMessage, Path};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::iframe::{Detection, IframeRuntime};
use crate::modal::{HostHooks, ModalController, ModalState};
use crate::window::window_pair;

/// Pause after each action so the iframe loop can catch up.
const STEP_GAP: Duration = Duration::from_millis(20);

fn default_origin() -> String {
    "https://shop.example".to_string()
}

fn default_form() -> String {
    "form.cart".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Origin shared by the parent page and the iframe.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// URL or post id passed to the overlay.
    pub open: String,

    /// Delay before the widget renders, to exercise detection retries.
    #[serde(default)]
    pub render_after_ms: u64,

    /// Content height once rendered.
    #[serde(default)]
    pub height: Option<u32>,

    pub widget: ElementSpec,

    #[serde(default)]
    pub steps: Vec<Action>,
}

/// A user action in the iframe document.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Pick an option of the first element matching `select` by its text.
    Choose { select: String, option: String },
    /// Click the control inside the label with this text.
    Check { label: String },
    Submit {
        #[serde(default = "default_form")]
        form: String,
    },
    /// Replace the widget with a fresh copy, as an AJAX refresh would.
    Rerender,
    Resize { height: u32 },
    Wait { ms: u64 },
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text).map_err(|e| BridgeError::Scenario(e.to_string()))
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Iframe URL the overlay opened.
    pub src: String,
    /// Messages the parent accepted, in arrival order.
    pub messages: Vec<IframeMessage>,
    /// Overlay state at the end of the run.
    pub modal: ModalState,
    pub last_sku: Option<(String, Path)>,
    pub detection: Detection,
}

/// Play `scenario` against a fresh window pair.
pub async fn replay(
    scenario: &Scenario,
    config: &Config,
    hooks: Arc<dyn HostHooks>,
) -> Result<ReplayReport, BridgeError> {
    let (parent, iframe) = window_pair(&scenario.origin, &scenario.origin);
    let mut inbox = parent.subscribe();

    let doc = Document::new();
    let handle = IframeRuntime::new(doc.clone(), Arc::new(iframe), config)?.spawn();
    let mut modal = ModalController::new(Arc::new(parent), config.bridge.clone(), hooks);

    // Stop the iframe loop whatever happened.
    let outcome = drive(&doc, &mut modal, scenario, config).await;
    let detection = handle.detection();
    handle.shutdown().await?;
    let src = outcome?;

    let messages = modal.drain(&mut inbox);
    info!(messages = messages.len(), ?detection, "replay finished");

    Ok(ReplayReport {
        src,
        messages,
        modal: modal.state().clone(),
        last_sku: modal.last_sku().map(|(sku, path)| (sku.to_string(), path)),
        detection,
    })
}

async fn drive(
    doc: &Document,
    modal: &mut ModalController,
    scenario: &Scenario,
    config: &Config,
) -> Result<String, BridgeError> {
    let src = modal.open(&scenario.open)?.to_string();
    modal.on_iframe_load()?;

    if scenario.render_after_ms > 0 {
        tokio::time::sleep(Duration::from_millis(scenario.render_after_ms)).await;
    }
    let mut widget = render(doc, scenario)?;
    tokio::time::sleep(STEP_GAP).await;

    for action in &scenario.steps {
        debug!(?action, "replaying");
        perform(doc, &mut widget, scenario, action).await?;
        tokio::time::sleep(STEP_GAP).await;
    }
    tokio::time::sleep(config.engine.initial_resize_delay() + STEP_GAP).await;
    Ok(src)
}

fn render(doc: &Document, scenario: &Scenario) -> Result<NodeId, BridgeError> {
    let widget = doc.append_spec(doc.body(), &scenario.widget)?;
    if let Some(height) = scenario.height {
        doc.set_scroll_height(height);
    }
    Ok(widget)
}

fn first_match(doc: &Document, scope: NodeId, selector: &str) -> Result<NodeId, BridgeError> {
    doc.select_all(scope, selector)?
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::Scenario(format!("nothing matches {}", selector)))
}

async fn perform(
    doc: &Document,
    widget: &mut NodeId,
    scenario: &Scenario,
    action: &Action,
) -> Result<(), BridgeError> {
    match action {
        Action::Choose { select, option } => {
            let node = first_match(doc, *widget, select)?;
            if !doc.choose_option_by_text(node, option) {
                warn!(select = %select, option = %option, "option not chosen");
            }
        }
        Action::Check { label } => {
            let found = doc
                .select_all(*widget, "label")?
                .into_iter()
                .find(|&node| doc.text_content(node).trim() == label)
                .ok_or_else(|| BridgeError::Scenario(format!("no label {:?}", label)))?;
            let input = first_match(doc, found, "input")?;
            doc.check(input);
        }
        Action::Submit { form } => {
            let node = first_match(doc, doc.root(), form)?;
            doc.submit(node);
        }
        Action::Rerender => {
            doc.remove(*widget);
            *widget = render(doc, scenario)?;
        }
        Action::Resize { height } => doc.set_scroll_height(*height),
        Action::Wait { ms } => tokio::time::sleep(Duration::from_millis(*ms)).await,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        let scenario = Scenario::from_json(
            r#"{
                "open": "/product/kit/",
                "widget": {"tag": "div"},
                "steps": [
                    {"action": "choose", "select": "select", "option": "16"},
                    {"action": "check", "label": "Custom Build"},
                    {"action": "submit"},
                    {"action": "rerender"},
                    {"action": "resize", "height": 900},
                    {"action": "wait", "ms": 50}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.origin, "https://shop.example");
        assert_eq!(scenario.steps.len(), 6);
        assert!(matches!(&scenario.steps[2], Action::Submit { form } if form == "form.cart"));
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let result = Scenario::from_json(
            r#"{"open": "1", "widget": {"tag": "div"}, "steps": [{"action": "drag"}]}"#,
        );
        assert!(matches!(result, Err(BridgeError::Scenario(_))));
    }
}
