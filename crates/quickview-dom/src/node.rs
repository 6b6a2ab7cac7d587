//! Node payloads stored in the document arena.

use std::collections::BTreeMap;

/// What a node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// Element payload: tag, attributes, inline style, and form-control state.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) style: BTreeMap<String, String>,
    pub(crate) checked: bool,
    pub(crate) selected: bool,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: BTreeMap::new(),
            checked: false,
            selected: false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, returning whether the value changed.
    pub(crate) fn set_attr(&mut self, name: &str, value: &str) -> bool {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) if existing == value => false,
            Some((_, existing)) => {
                *existing = value.to_string();
                true
            }
            None => {
                self.attrs.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(key, _)| key != name);
        self.attrs.len() != before
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Input `type`, lowercased; `text` when absent.
    pub fn input_type(&self) -> String {
        self.attr("type").unwrap_or("text").to_ascii_lowercase()
    }

    pub fn is_disabled(&self) -> bool {
        self.attr("disabled").is_some()
    }

    pub(crate) fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(prop, value)| format!("{}: {}", prop, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}
