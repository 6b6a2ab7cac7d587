//! Declarative markup for building documents in tests, demos, and replays.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An element and its subtree.
///
/// ```json
/// { "tag": "div", "attrs": { "class": "af-cp-step" },
///   "children": [ { "tag": "h4", "text": "Pick a count" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Text placed before any child elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append one or more space-separated classes.
    pub fn class(mut self, class: &str) -> Self {
        let merged = match self.attrs.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.attrs.insert("class".to_string(), merged);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }

    /// `<option value="..">text</option>`
    pub fn option(value: &str, text: &str) -> Self {
        Self::new("option").attr("value", value).text(text)
    }

    /// `<label><input type="radio" name=".." value=".."> label</label>`
    pub fn radio(name: &str, value: &str, label: &str) -> Self {
        Self::new("label").text(label).child(
            Self::new("input")
                .attr("type", "radio")
                .attr("name", name)
                .attr("value", value),
        )
    }
}
