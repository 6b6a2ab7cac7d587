use serde_json::json;

use super::*;

#[test]
fn test_resize_to_wire() {
    let wire = IframeMessage::Resize { height: 812 }.to_wire().unwrap();
    assert_eq!(wire, json!({"type": "tpb-qv", "action": "resize", "height": 812}));
}

#[test]
fn test_sku_swap_to_wire() {
    let msg = IframeMessage::SkuSwap {
        sku: "BUNDLE-16-SKU-wall-mount-walnut-COMPLETE".to_string(),
        path: Path::Predesigned,
    };
    let wire = msg.to_wire().unwrap();
    assert_eq!(wire["action"], "sku-swap");
    assert_eq!(wire["path"], "predesigned");
    assert_eq!(IframeMessage::from_wire(&wire).unwrap(), msg);
}

#[test]
fn test_add_to_cart_field_names() {
    let msg = IframeMessage::AddToCart {
        product_id: Some("42".to_string()),
        sku: None,
        path: None,
    };
    let wire = msg.to_wire().unwrap();
    assert_eq!(wire["productId"], "42");
    assert!(wire["sku"].is_null());
}

#[test]
fn test_selection_report_shape() {
    let msg = IframeMessage::CpbSelection {
        selection: SelectionReport {
            component: "Build Strategy".to_string(),
            role: StepRole::Strategy,
            index: 1,
            value: "Custom Build".into(),
            all_selections: SelectionState::new()
                .with(StepRole::Count, "12-SKU-HARDWARE-KIT")
                .with(StepRole::Strategy, "Custom Build"),
        },
    };
    let wire = msg.to_wire().unwrap();
    assert_eq!(wire["action"], "cpb-selection");
    assert_eq!(wire["selection"]["role"], "strategy");
    assert_eq!(wire["selection"]["allSelections"]["count"], "12-SKU-HARDWARE-KIT");
}

#[test]
fn test_init_round_trip() {
    let msg = ParentMessage::Init {
        config: InitConfig::new("https://shop.example/", "tpb_qv"),
    };
    let wire = msg.to_wire().unwrap();
    assert_eq!(wire["type"], "tpb-qv-config");
    assert_eq!(wire["config"]["qvParam"], "tpb_qv");
    assert_eq!(wire["config"]["enableSKUSwap"], true);
    assert_eq!(ParentMessage::from_wire(&wire).unwrap(), msg);
}

#[test]
fn test_init_flags_default_to_true() {
    let wire = json!({
        "type": "tpb-qv-config",
        "action": "init",
        "config": {"home": "https://shop.example/", "qvParam": "tpb_qv"}
    });
    let ParentMessage::Init { config } = ParentMessage::from_wire(&wire).unwrap();
    assert!(config.enable_sku_swap);
    assert!(config.enable_analytics);
}

#[test]
fn test_from_wire_rejects_other_type() {
    let wire = json!({"type": "tpb-qv-config", "action": "resize", "height": 1});
    assert!(matches!(
        IframeMessage::from_wire(&wire),
        Err(ProtocolError::UnexpectedType(_))
    ));
}

#[test]
fn test_from_wire_rejects_unknown_action() {
    let wire = json!({"type": "tpb-qv", "action": "teleport"});
    assert!(matches!(
        IframeMessage::from_wire(&wire),
        Err(ProtocolError::UnrecognizedAction(action)) if action == "teleport"
    ));
}

#[test]
fn test_from_wire_reports_malformed_payload() {
    let wire = json!({"type": "tpb-qv", "action": "resize", "height": "tall"});
    assert!(matches!(
        IframeMessage::from_wire(&wire),
        Err(ProtocolError::MalformedPayload { .. })
    ));
}

#[test]
fn test_from_wire_requires_type() {
    assert!(matches!(
        IframeMessage::from_wire(&json!({"action": "resize"})),
        Err(ProtocolError::MissingType)
    ));
    assert!(matches!(
        IframeMessage::from_wire(&json!("tpb-qv")),
        Err(ProtocolError::MissingType)
    ));
}
