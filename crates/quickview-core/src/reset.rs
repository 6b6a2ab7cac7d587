//! Clearing a step's selection.

use quickview_config::PlaceholderLabels;
use quickview_dom::{Document, ElementSpec, NodeId, Selector};
use quickview_protocols::StepRole;
use regex::{Regex, RegexBuilder};
use tracing::{trace, warn};

use crate::error::{parse_selector, CoreError};
use crate::selection::{inclusive, PLACEHOLDER_ATTR};

const HIDDEN_SELECTION_PATTERN: &str = "af_cp_selected|selected_product";

/// Removes every trace of a selection from a step container.
///
/// The widget pre-selects defaults, which would defeat a guided flow. A
/// reset unchecks radios and checkboxes, points selects at a disabled
/// placeholder (injected once), drops pre-rendered selection markers and
/// blanks the hidden inputs that mirror them.
#[derive(Debug, Clone)]
pub struct SelectionResetter {
    labels: PlaceholderLabels,
    choices: Selector,
    selects: Selector,
    markers: Selector,
    hidden: Selector,
    hidden_names: Regex,
}

impl SelectionResetter {
    pub fn new(labels: PlaceholderLabels) -> Result<Self, CoreError> {
        let hidden_names = RegexBuilder::new(HIDDEN_SELECTION_PATTERN)
            .case_insensitive(true)
            .build()
            .map_err(|source| CoreError::InvalidPattern {
                field: "hidden selection inputs".to_string(),
                source,
            })?;

        Ok(Self {
            labels,
            choices: parse_selector("input[type=radio], input[type=checkbox]")?,
            selects: parse_selector("select")?,
            markers: parse_selector(".af-cp-selected-product")?,
            hidden: parse_selector("input[type=hidden]")?,
            hidden_names,
        })
    }

    pub fn placeholder_label(&self, role: StepRole) -> &str {
        match role {
            StepRole::Count => &self.labels.count,
            StepRole::Strategy => &self.labels.strategy,
            StepRole::Bundle => &self.labels.bundle,
            StepRole::Unknown => &self.labels.unknown,
        }
    }

    pub fn clear(&self, doc: &Document, container: NodeId, role: StepRole) {
        for input in inclusive(doc, container, &self.choices) {
            doc.set_checked(input, false);
        }

        for select in inclusive(doc, container, &self.selects) {
            self.reset_select(doc, select, role);
        }

        for marker in doc.query_selector_all(container, &self.markers) {
            doc.remove(marker);
        }

        for hidden in doc.query_selector_all(container, &self.hidden) {
            let name = doc.attr(hidden, "name").unwrap_or_default();
            if self.hidden_names.is_match(&name) {
                doc.set_attr(hidden, "value", "");
            }
        }
    }

    fn reset_select(&self, doc: &Document, select: NodeId, role: StepRole) {
        let options = doc.options(select);
        let existing = options
            .iter()
            .position(|&option| doc.has_attr(option, PLACEHOLDER_ATTR));

        let index = match existing {
            Some(index) => index,
            None => {
                let spec = ElementSpec::new("option")
                    .attr("value", "")
                    .attr("disabled", "")
                    .attr(PLACEHOLDER_ATTR, "")
                    .text(self.placeholder_label(role));
                match doc.append_spec(select, &spec) {
                    Ok(placeholder) => {
                        // Move it in front of the widget's options.
                        if let Err(e) = doc.prepend_child(select, placeholder) {
                            warn!(error = %e, "could not reorder placeholder option");
                        }
                        trace!(role = %role, "injected placeholder option");
                        doc.options(select)
                            .iter()
                            .position(|&option| option == placeholder)
                            .unwrap_or(0)
                    }
                    Err(e) => {
                        warn!(error = %e, "could not inject placeholder option");
                        doc.set_selected_index(select, None);
                        return;
                    }
                }
            }
        };
        doc.set_selected_index(select, Some(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resetter() -> SelectionResetter {
        SelectionResetter::new(PlaceholderLabels::default()).unwrap()
    }

    #[test]
    fn test_placeholder_injected_once() {
        let doc = Document::new();
        let select = doc
            .append_spec(
                doc.body(),
                &ElementSpec::new("select")
                    .child(ElementSpec::option("a", "A"))
                    .child(ElementSpec::option("b", "B").selected()),
            )
            .unwrap();

        let resetter = resetter();
        resetter.clear(&doc, select, StepRole::Count);
        resetter.clear(&doc, select, StepRole::Count);

        let options = doc.options(select);
        assert_eq!(options.len(), 3);
        assert!(doc.has_attr(options[0], PLACEHOLDER_ATTR));
        assert_eq!(doc.text_content(options[0]), PlaceholderLabels::default().count);
        assert_eq!(doc.selected_index(select), Some(0));
    }

    #[test]
    fn test_clears_choices_markers_and_hidden_inputs() {
        let doc = Document::new();
        let container = doc
            .append_spec(
                doc.body(),
                &ElementSpec::new("div")
                    .child(ElementSpec::new("input").attr("type", "checkbox").checked())
                    .child(ElementSpec::new("div").class("af-cp-selected-product").text("Oak"))
                    .child(
                        ElementSpec::new("input")
                            .attr("type", "hidden")
                            .attr("name", "AF_CP_SELECTED[3]")
                            .attr("value", "9"),
                    )
                    .child(
                        ElementSpec::new("input")
                            .attr("type", "hidden")
                            .attr("name", "nonce")
                            .attr("value", "abc"),
                    ),
            )
            .unwrap();

        let children = doc.children(container);
        resetter().clear(&doc, container, StepRole::Bundle);

        assert!(!doc.is_checked(children[0]));
        assert!(!doc.is_connected(children[1]));
        assert_eq!(doc.attr(children[2], "value").as_deref(), Some(""));
        assert_eq!(doc.attr(children[3], "value").as_deref(), Some("abc"));
    }
}
