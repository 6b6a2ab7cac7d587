//! End-to-end runs across the frame boundary, on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use quickview_bridge::{
    replay, window_pair, Detection, IframeHandle, IframeRuntime, ModalController, NoopHooks,
    Scenario, Window,
};
use quickview_config::Config;
use quickview_core::fixtures;
use quickview_dom::{Document, ElementSpec, NodeId};
use quickview_protocols::{
    FramePort, IframeMessage, InitConfig, MessageEvent, ParentMessage, Path, StepRole, WireMessage,
};
use serde_json::json;
use tokio::sync::broadcast;

const ORIGIN: &str = "https://shop.example";
const COLLAPSED: &str = "tpb-collapsed";

fn config() -> Config {
    let mut config = Config::default();
    config.bridge.home = "https://shop.example/".to_string();
    config
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

struct Page {
    doc: Document,
    iframe: Window,
    modal: ModalController,
    inbox: broadcast::Receiver<MessageEvent>,
    handle: IframeHandle,
}

impl Page {
    /// Open the overlay on a document that may already hold the widget.
    async fn open(widget: Option<ElementSpec>) -> Self {
        let config = config();
        let (parent, iframe) = window_pair(ORIGIN, ORIGIN);
        let inbox = parent.subscribe();

        let doc = Document::new();
        if let Some(widget) = widget {
            doc.append_spec(doc.body(), &widget).unwrap();
        }
        let handle = IframeRuntime::new(doc.clone(), Arc::new(iframe.clone()), &config)
            .unwrap()
            .spawn();
        let mut modal = ModalController::new(Arc::new(parent), config.bridge, Arc::new(NoopHooks));
        modal.open("1234").unwrap();
        modal.on_iframe_load().unwrap();
        settle().await;

        Self {
            doc,
            iframe,
            modal,
            inbox,
            handle,
        }
    }

    fn containers(&self) -> Vec<NodeId> {
        self.doc.select_all(self.doc.root(), ".single_component").unwrap()
    }

    fn collapsed(&self) -> Vec<bool> {
        self.containers()
            .into_iter()
            .map(|c| self.doc.has_class(c, COLLAPSED))
            .collect()
    }

    async fn choose(&mut self, name: &str, text: &str) {
        let select = self
            .doc
            .select_all(self.doc.root(), &format!("select[name={}]", name))
            .unwrap()[0];
        assert!(self.doc.choose_option_by_text(select, text), "{text} not chosen");
        settle().await;
    }

    async fn click_label(&mut self, text: &str) {
        let label = self
            .doc
            .select_all(self.doc.root(), "label")
            .unwrap()
            .into_iter()
            .find(|&label| self.doc.text_content(label).trim() == text)
            .unwrap();
        let input = self.doc.select_all(label, "input").unwrap()[0];
        assert!(self.doc.check(input));
        settle().await;
    }

    fn messages(&mut self) -> Vec<IframeMessage> {
        self.modal.drain(&mut self.inbox)
    }
}

fn sku_swaps(messages: &[IframeMessage]) -> Vec<(String, Path)> {
    messages
        .iter()
        .filter_map(|m| match m {
            IframeMessage::SkuSwap { sku, path } => Some((sku.clone(), *path)),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_initialize_shows_only_first_step() {
    let page = Page::open(Some(fixtures::configurator())).await;

    assert_eq!(page.handle.detection(), Detection::Mounted);
    assert_eq!(page.collapsed(), vec![false, true, true]);

    // Widget defaults were cleared.
    let count = page.doc.select_all(page.doc.root(), "select[name=count]").unwrap()[0];
    let placeholder = page.doc.options(count)[0];
    assert_eq!(page.doc.selected_index(count), Some(0));
    assert!(page.doc.has_attr(placeholder, "data-tpb-placeholder"));
    let checked = page.doc.select_all(page.doc.root(), "input:checked").unwrap();
    assert!(checked.is_empty());

    let runtime = page.handle.shutdown().await.unwrap();
    let roles: Vec<StepRole> = runtime.engine().steps().iter().map(|s| s.role).collect();
    assert_eq!(roles, vec![StepRole::Count, StepRole::Strategy, StepRole::Bundle]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_build_swaps_to_count_sku() {
    let mut page = Page::open(Some(fixtures::configurator())).await;

    page.choose("count", "12-SKU-HARDWARE-KIT").await;
    assert_eq!(page.collapsed(), vec![false, false, true]);
    page.click_label("Custom Build").await;

    assert_eq!(page.collapsed(), vec![false, false, true]);
    let messages = page.messages();
    assert_eq!(
        sku_swaps(&messages),
        vec![("12-SKU-HARDWARE-KIT".to_string(), Path::Custom)]
    );
    assert_eq!(page.modal.last_sku(), Some(("12-SKU-HARDWARE-KIT", Path::Custom)));

    let IframeMessage::CpbSelection { selection } = &messages[1] else {
        panic!("expected a selection report, got {:?}", messages[1]);
    };
    assert_eq!(selection.component, "Build Strategy");
    assert_eq!(selection.role, StepRole::Strategy);
    assert_eq!(selection.value.primary(), "Custom Build");
}

#[tokio::test(start_paused = true)]
async fn test_predesigned_bundle_sku() {
    let mut page = Page::open(Some(fixtures::configurator())).await;

    page.choose("count", "16").await;
    page.click_label("Pre-designed").await;
    assert_eq!(page.collapsed(), vec![false, false, false]);
    page.choose("mount", "Wall Mount").await;
    assert!(sku_swaps(&page.messages()).is_empty());
    page.choose("finish", "Walnut").await;

    let expected = ("BUNDLE-16-SKU-wall-mount-walnut-COMPLETE".to_string(), Path::Predesigned);
    assert_eq!(sku_swaps(&page.messages()), vec![expected]);

    let form = page.doc.select_all(page.doc.root(), "form.cart").unwrap()[0];
    page.doc.submit(form);
    settle().await;
    assert_eq!(
        page.messages(),
        vec![IframeMessage::AddToCart {
            product_id: Some("1234".to_string()),
            sku: Some("BUNDLE-16-SKU-wall-mount-walnut-COMPLETE".to_string()),
            path: Some(Path::Predesigned),
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_foreign_origin_messages_change_nothing() {
    let mut page = Page::open(None).await;
    assert_eq!(page.handle.detection(), Detection::Detecting { attempts: 1 });

    // Forged traffic on both sides.
    let mut forged = InitConfig::new("https://evil.example/", "steal");
    forged.enable_sku_swap = false;
    page.iframe.deliver(MessageEvent::new(
        "https://evil.example",
        ParentMessage::Init { config: forged }.to_wire().unwrap(),
    ));
    page.iframe.deliver(MessageEvent::new(ORIGIN, json!({"type": "tpb-qv-config", "action": "reset"})));
    let before = page.modal.state().clone();
    page.modal.handle_message(&MessageEvent::new(
        "https://evil.example",
        json!({"type": "tpb-qv", "action": "resize", "height": 1}),
    ));
    settle().await;

    assert_eq!(page.modal.state(), &before);
    let runtime = page.handle.shutdown().await.unwrap();
    let init = runtime.init_config().unwrap();
    assert_eq!(init.home, "https://shop.example/");
    assert!(init.enable_sku_swap);
    assert_eq!(
        runtime.navigation_url("/cart/").unwrap(),
        "https://shop.example/cart/?tpb_qv=1"
    );
}

#[tokio::test(start_paused = true)]
async fn test_absent_widget_gives_up_without_touching_dom() {
    let mut page = Page::open(Some(ElementSpec::new("div").class("product"))).await;
    let mutations = page.doc.subscribe_mutations();

    tokio::time::sleep(Duration::from_millis(1600)).await;

    assert_eq!(page.handle.detection(), Detection::GaveUp { attempts: 4 });
    assert!(mutations.is_empty());
    assert!(
        page.messages()
            .iter()
            .all(|m| matches!(m, IframeMessage::Resize { .. }))
    );
    let runtime = page.handle.shutdown().await.unwrap();
    assert!(!runtime.engine().is_mounted());
}

#[tokio::test(start_paused = true)]
async fn test_rerendered_widget_is_reinitialized() {
    let mut page = Page::open(Some(fixtures::configurator())).await;
    page.choose("count", "16").await;
    page.click_label("Pre-designed").await;
    assert_eq!(page.collapsed(), vec![false, false, false]);

    // The widget swaps its markup for a fresh copy with defaults selected.
    let widget = page.doc.children(page.doc.body())[0];
    page.doc.remove(widget);
    page.doc.append_spec(page.doc.body(), &fixtures::configurator()).unwrap();
    settle().await;

    assert_eq!(page.collapsed(), vec![false, true, true]);
    let checked = page.doc.select_all(page.doc.root(), "input:checked").unwrap();
    assert!(checked.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rerender_after_observation_window_still_guides() {
    let mut page = Page::open(Some(fixtures::configurator())).await;
    page.choose("count", "16").await;
    page.click_label("Pre-designed").await;
    page.choose("mount", "Wall Mount").await;
    page.choose("finish", "Walnut").await;
    assert_eq!(sku_swaps(&page.messages()).len(), 1);

    tokio::time::sleep(config().engine.observation_window() + Duration::from_secs(1)).await;

    let widget = page.doc.children(page.doc.body())[0];
    page.doc.remove(widget);
    page.doc.append_spec(page.doc.body(), &fixtures::configurator()).unwrap();
    settle().await;

    // Nothing resolved on the new markup yet, so no SKU goes with the cart.
    let form = page.doc.select_all(page.doc.root(), "form.cart").unwrap()[0];
    page.doc.submit(form);
    settle().await;
    assert_eq!(
        page.messages(),
        vec![IframeMessage::AddToCart {
            product_id: Some("1234".to_string()),
            sku: None,
            path: None,
        }]
    );

    page.choose("count", "8-SKU-HARDWARE-KIT").await;
    assert_eq!(page.collapsed(), vec![false, false, true]);
    page.click_label("Custom Build").await;

    let messages = page.messages();
    let selections = messages
        .iter()
        .filter(|m| matches!(m, IframeMessage::CpbSelection { .. }))
        .count();
    assert_eq!(selections, 2);
    assert_eq!(
        sku_swaps(&messages),
        vec![("8-SKU-HARDWARE-KIT".to_string(), Path::Custom)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_height_changes_reach_overlay() {
    let mut page = Page::open(Some(fixtures::configurator())).await;
    page.doc.set_scroll_height(640);
    settle().await;
    page.doc.set_scroll_height(640);
    page.doc.set_scroll_height(720);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let heights: Vec<u32> = page
        .messages()
        .into_iter()
        .filter_map(|m| match m {
            IframeMessage::Resize { height } => Some(height),
            _ => None,
        })
        .collect();
    assert_eq!(heights, vec![640, 720]);
    assert_eq!(page.modal.state().iframe_height, Some(720));
}

#[tokio::test(start_paused = true)]
async fn test_replay_demo_scenario() {
    let scenario = Scenario::from_json(include_str!("../../../demos/predesigned.json")).unwrap();
    let report = replay(&scenario, &config(), Arc::new(NoopHooks)).await.unwrap();

    assert_eq!(report.src, "https://shop.example/?p=1234&tpb_qv=1");
    assert_eq!(report.detection, Detection::Mounted);

    let actions: Vec<&str> = report.messages.iter().map(IframeMessage::action).collect();
    assert_eq!(
        actions,
        vec![
            "cpb-selection",
            "cpb-selection",
            "cpb-selection",
            "cpb-selection",
            "sku-swap",
            "resize",
            "resize",
            "add-to-cart",
        ]
    );
    assert_eq!(
        report.last_sku,
        Some(("BUNDLE-16-SKU-wall-mount-walnut-COMPLETE".to_string(), Path::Predesigned))
    );
    assert_eq!(report.modal.iframe_height, Some(900));
}
