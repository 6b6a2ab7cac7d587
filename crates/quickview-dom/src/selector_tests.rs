use super::*;
use crate::{Document, ElementSpec};

fn sample() -> (Document, NodeId) {
    let doc = Document::new();
    let form = doc
        .append_spec(
            doc.body(),
            &ElementSpec::new("form")
                .class("cart")
                .child(
                    ElementSpec::new("div")
                        .attr("id", "wrap")
                        .class("af-cp-step pc-step")
                        .child(
                            ElementSpec::new("input")
                                .attr("type", "radio")
                                .attr("name", "count")
                                .attr("value", "A")
                                .checked(),
                        )
                        .child(
                            ElementSpec::new("input")
                                .attr("type", "radio")
                                .attr("name", "count")
                                .attr("value", "B")
                                .attr("disabled", ""),
                        ),
                ),
        )
        .unwrap();
    (doc, form)
}

#[test]
fn test_parse_rejects_empty() {
    assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
}

#[test]
fn test_parse_rejects_unknown_pseudo() {
    assert_eq!(
        Selector::parse("input:hover"),
        Err(SelectorError::UnsupportedPseudo("hover".to_string()))
    );
}

#[test]
fn test_parse_rejects_unterminated_attribute() {
    assert!(Selector::parse("[data-component=\"sku").is_err());
    assert!(Selector::parse("div[").is_err());
}

#[test]
fn test_parse_rejects_trailing_garbage() {
    assert!(matches!(
        Selector::parse("div)"),
        Err(SelectorError::Unexpected { found: ')', .. })
    ));
}

#[test]
fn test_display_keeps_source() {
    let selector = Selector::parse("  .af-cp-step, .pc-step ").unwrap();
    assert_eq!(selector.to_string(), ".af-cp-step, .pc-step");
}

#[test]
fn test_class_and_id() {
    let (doc, form) = sample();
    assert_eq!(doc.select_all(form, ".af-cp-step").unwrap().len(), 1);
    assert_eq!(doc.select_all(form, "div#wrap.pc-step").unwrap().len(), 1);
    assert!(doc.select_all(form, "#missing").unwrap().is_empty());
}

#[test]
fn test_attribute_selectors() {
    let (doc, form) = sample();
    assert_eq!(doc.select_all(form, "input[type=radio]").unwrap().len(), 2);
    assert_eq!(doc.select_all(form, "[value='B']").unwrap().len(), 1);
    assert_eq!(doc.select_all(form, "[disabled]").unwrap().len(), 1);
}

#[test]
fn test_state_pseudo_classes() {
    let (doc, form) = sample();
    let checked = doc.select_all(form, "input:checked").unwrap();
    assert_eq!(checked.len(), 1);
    assert_eq!(doc.attr(checked[0], "value").as_deref(), Some("A"));

    let enabled = doc.select_all(form, "input:not(:disabled)").unwrap();
    assert_eq!(enabled, checked);
}

#[test]
fn test_combinators() {
    let (doc, _) = sample();
    let root = doc.root();
    assert_eq!(doc.select_all(root, "form.cart input").unwrap().len(), 2);
    assert_eq!(doc.select_all(root, "form > input").unwrap().len(), 0);
    assert_eq!(doc.select_all(root, "form > div > input").unwrap().len(), 2);
}

#[test]
fn test_selector_list_preserves_document_order() {
    let (doc, form) = sample();
    let found = doc.select_all(form, "input, div").unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(doc.tag(found[0]).as_deref(), Some("div"));
}

#[test]
fn test_universal() {
    let (doc, form) = sample();
    assert_eq!(doc.select_all(form, "*").unwrap().len(), 3);
}
