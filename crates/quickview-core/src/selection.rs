//! Reading a step's current value.

use std::collections::HashSet;

use quickview_dom::{Document, NodeId, Selector};
use quickview_protocols::SelectionValue;

use crate::error::{parse_selector, CoreError};

/// Marker attribute on placeholder options injected by the engine.
pub const PLACEHOLDER_ATTR: &str = "data-tpb-placeholder";

const MARKER_SELECTOR: &str = ".af-cp-selected-product";
const CHOICE_SELECTOR: &str = "input[type=radio]:checked, input[type=checkbox]:checked";
const CONTROL_SELECTOR: &str = "select, input[type=radio], input[type=checkbox]";

/// Extracts the value of a step container whatever control encodes it.
///
/// A container with no interpretable value reads as "no selection".
#[derive(Debug, Clone)]
pub struct SelectionReader {
    marker: Selector,
    choices: Selector,
    controls: Selector,
    select: Selector,
    label: Selector,
}

impl SelectionReader {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            marker: parse_selector(MARKER_SELECTOR)?,
            choices: parse_selector(CHOICE_SELECTOR)?,
            controls: parse_selector(CONTROL_SELECTOR)?,
            select: parse_selector("select")?,
            label: parse_selector("label")?,
        })
    }

    /// First value found, checking in order: a checked radio or checkbox,
    /// a select's chosen option, the widget's selected-product marker.
    pub fn read(&self, doc: &Document, container: NodeId) -> Option<String> {
        inclusive(doc, container, &self.choices)
            .into_iter()
            .find_map(|input| self.choice_value(doc, input))
            .or_else(|| {
                inclusive(doc, container, &self.select)
                    .into_iter()
                    .find_map(|select| self.select_value(doc, select))
            })
            .or_else(|| self.marker_value(doc, container))
    }

    /// The complete value of a step, one part per control in DOM order.
    ///
    /// Every select and radio group must hold a value; unchecked checkboxes
    /// are skipped. Steps without controls fall back to the marker text.
    pub fn read_value(&self, doc: &Document, container: NodeId) -> Option<SelectionValue> {
        let mut parts = Vec::new();
        let mut groups = HashSet::new();

        for control in inclusive(doc, container, &self.controls) {
            if doc.tag(control).as_deref() == Some("select") {
                parts.push(self.select_value(doc, control)?);
                continue;
            }

            let is_radio = doc.attr(control, "type").is_some_and(|t| t.eq_ignore_ascii_case("radio"));
            if !is_radio {
                if doc.is_checked(control) {
                    parts.extend(self.choice_value(doc, control));
                }
                continue;
            }

            let name = doc.attr(control, "name").unwrap_or_default();
            if !groups.insert(name.clone()) {
                continue;
            }
            let checked = inclusive(doc, container, &self.controls)
                .into_iter()
                .find(|&other| {
                    doc.is_checked(other) && doc.attr(other, "name").unwrap_or_default() == name
                })?;
            parts.extend(self.choice_value(doc, checked));
        }

        if parts.is_empty() {
            return self.marker_value(doc, container).map(SelectionValue::from);
        }
        SelectionValue::from_parts(parts)
    }

    /// `value` unless empty or the browser default `on`, else label text.
    fn choice_value(&self, doc: &Document, input: NodeId) -> Option<String> {
        let value = doc.value(input).unwrap_or_default();
        let value = value.trim();
        if !value.is_empty() && value != "on" {
            return Some(value.to_string());
        }
        self.label_text(doc, input)
    }

    fn label_text(&self, doc: &Document, input: NodeId) -> Option<String> {
        let label = doc.closest(input, &self.label).or_else(|| {
            let id = doc.attr(input, "id")?;
            let selector = Selector::parse(&format!("label[for=\"{}\"]", id)).ok()?;
            doc.query_selector(doc.root(), &selector)
        })?;
        non_empty(doc.text_content(label))
    }

    /// Chosen option text, ignoring the injected placeholder.
    fn select_value(&self, doc: &Document, select: NodeId) -> Option<String> {
        let index = doc.selected_index(select)?;
        let option = *doc.options(select).get(index)?;
        let placeholder = doc.has_attr(option, PLACEHOLDER_ATTR)
            || (doc.is_disabled(option) && doc.attr(option, "value").is_some_and(|v| v.is_empty()));
        if placeholder {
            return None;
        }
        non_empty(doc.text_content(option)).or_else(|| doc.value(option).and_then(non_empty))
    }

    fn marker_value(&self, doc: &Document, container: NodeId) -> Option<String> {
        inclusive(doc, container, &self.marker)
            .into_iter()
            .find_map(|marker| non_empty(doc.text_content(marker)))
    }
}

/// Matches under `container`, plus the container itself.
pub(crate) fn inclusive(doc: &Document, container: NodeId, selector: &Selector) -> Vec<NodeId> {
    let mut found = Vec::new();
    if doc.matches(container, selector) {
        found.push(container);
    }
    found.extend(doc.query_selector_all(container, selector));
    found
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
