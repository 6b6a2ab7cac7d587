//! Shared, observable document tree.

use std::fmt;
use std::sync::Arc;

use indextree::{Arena, NodeId};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::DomError;
use crate::events::{DomEvent, DomEventKind, MutationRecord};
use crate::fixture::ElementSpec;
use crate::node::{ElementData, NodeKind};
use crate::selector::{MatchContext, Selector};

const CHANNEL_CAPACITY: usize = 256;

struct Tree {
    arena: Arena<NodeKind>,
    root: NodeId,
    body: NodeId,
    scroll_height: u32,
}

impl Tree {
    fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeKind::Document);
        let body = arena.new_node(NodeKind::Element(ElementData::new("body")));
        root.append(body, &mut arena);
        Self {
            arena,
            root,
            body,
            scroll_height: 0,
        }
    }

    fn exists(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some()
    }

    fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.arena.get(node).map(|n| n.get())
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.kind(node).and_then(NodeKind::as_element)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.arena
            .get_mut(node)
            .and_then(|n| n.get_mut().as_element_mut())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        if !self.exists(node) {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Strict descendants in document order.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        if !self.exists(scope) {
            return Vec::new();
        }
        scope.descendants(&self.arena).skip(1).collect()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.exists(node) && node.ancestors(&self.arena).any(|a| a == self.root)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.exists(node) && node.ancestors(&self.arena).any(|a| a == ancestor)
    }

    fn text_content(&self, node: NodeId) -> String {
        if !self.exists(node) {
            return String::new();
        }
        node.descendants(&self.arena)
            .filter_map(|id| match self.kind(id) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn query(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        if !self.exists(node) {
            return None;
        }
        node.ancestors(&self.arena)
            .find(|&id| selector.matches(self, id))
    }

    fn nearest_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        if !self.exists(node) {
            return None;
        }
        node.ancestors(&self.arena)
            .find(|&id| self.element(id).is_some_and(|e| e.tag == tag))
    }

    fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.tag == "option"))
            .collect()
    }

    fn selected_index(&self, select: NodeId) -> Option<usize> {
        let options = self.options(select);
        options
            .iter()
            .position(|&id| self.element(id).is_some_and(|e| e.selected))
            .or_else(|| {
                options
                    .iter()
                    .position(|&id| self.element(id).is_some_and(|e| !e.is_disabled()))
            })
    }

    fn select_option(&mut self, select: NodeId, index: Option<usize>) {
        for (i, option) in self.options(select).into_iter().enumerate() {
            if let Some(element) = self.element_mut(option) {
                element.selected = Some(i) == index;
            }
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        match element.tag.as_str() {
            "input" => {
                let fallback = match element.input_type().as_str() {
                    "radio" | "checkbox" => "on",
                    _ => "",
                };
                Some(element.attr("value").unwrap_or(fallback).to_string())
            }
            "option" => Some(
                element
                    .attr("value")
                    .map(str::to_string)
                    .unwrap_or_else(|| self.text_content(node)),
            ),
            "select" => {
                let index = self.selected_index(node)?;
                let option = *self.options(node).get(index)?;
                self.value(option)
            }
            _ => element.attr("value").map(str::to_string),
        }
    }

    /// Topmost ancestor of a detached node; `None` when connected or gone.
    fn detached_root(&self, node: NodeId) -> Option<NodeId> {
        if !self.exists(node) {
            return None;
        }
        let top = node.ancestors(&self.arena).last()?;
        (top != self.root).then_some(top)
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node);
        node.detach(&mut self.arena);
        parent
    }

    fn build(&mut self, spec: &ElementSpec) -> NodeId {
        let mut element = ElementData::new(&spec.tag);
        for (name, value) in &spec.attrs {
            if name == "style" {
                element.style = parse_style(value);
            } else {
                element.set_attr(name, value);
            }
        }
        element.checked = spec.checked || element.attr("checked").is_some();
        element.selected = spec.selected || element.attr("selected").is_some();

        let node = self.arena.new_node(NodeKind::Element(element));
        if let Some(text) = &spec.text {
            let text_node = self.arena.new_node(NodeKind::Text(text.clone()));
            node.append(text_node, &mut self.arena);
        }
        for child in &spec.children {
            let child_node = self.build(child);
            node.append(child_node, &mut self.arena);
        }
        node
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        match (self.kind(parent), self.kind(child)) {
            (None, _) | (_, None) => Err(DomError::NodeNotFound),
            (Some(NodeKind::Text(_)), _) => {
                Err(DomError::HierarchyRequest("text nodes cannot have children".into()))
            }
            (_, Some(NodeKind::Document)) => {
                Err(DomError::HierarchyRequest("the document node cannot be inserted".into()))
            }
            _ if self.contains(child, parent) => Err(DomError::HierarchyRequest(
                "a node cannot be inserted into its own subtree".into(),
            )),
            _ => Ok(()),
        }
    }
}

impl MatchContext for Tree {
    fn tag_of(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    fn attr_of(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn checked(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|e| match e.tag.as_str() {
            "input" => e.checked,
            "option" => e.selected,
            _ => false,
        })
    }
}

fn parse_style(text: &str) -> std::collections::BTreeMap<String, String> {
    text.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// A document tree shared between the widget, the configurator, and the
/// frame bridge.
///
/// Cloning is cheap and every clone observes the same tree and channels.
/// Removed nodes are detached, not freed: their ids stay valid and report
/// `is_connected() == false`.
#[derive(Clone)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
    events: broadcast::Sender<DomEvent>,
    mutations: broadcast::Sender<MutationRecord>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.read();
        f.debug_struct("Document")
            .field("nodes", &tree.arena.count())
            .field("scroll_height", &tree.scroll_height)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (mutations, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tree: Arc::new(RwLock::new(Tree::new())),
            events,
            mutations,
        }
    }

    /// Build a document whose body holds `spec`.
    pub fn from_spec(spec: &ElementSpec) -> Result<Self, DomError> {
        let doc = Self::new();
        doc.append_spec(doc.body(), spec)?;
        Ok(doc)
    }

    pub fn root(&self) -> NodeId {
        self.tree.read().root
    }

    pub fn body(&self) -> NodeId {
        self.tree.read().body
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DomEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_mutations(&self) -> broadcast::Receiver<MutationRecord> {
        self.mutations.subscribe()
    }

    fn notify(&self, records: Vec<MutationRecord>) {
        for record in records {
            // No observers is not an error.
            let _ = self.mutations.send(record);
        }
    }

    fn dispatch(&self, kind: DomEventKind, target: NodeId) {
        trace!(?kind, ?target, "dispatching event");
        let _ = self.events.send(DomEvent { kind, target });
    }

    // Tree structure

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree
            .write()
            .arena
            .new_node(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.tree
            .write()
            .arena
            .new_node(NodeKind::Text(text.to_string()))
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert(parent, child, false)
    }

    pub fn prepend_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert(parent, child, true)
    }

    fn insert(&self, parent: NodeId, child: NodeId, first: bool) -> Result<(), DomError> {
        let mut records = Vec::new();
        {
            let mut tree = self.tree.write();
            tree.check_insertion(parent, child)?;
            if let Some(old_parent) = tree.detach(child) {
                records.push(MutationRecord::ChildList { target: old_parent });
            }
            let result = if first {
                parent.checked_prepend(child, &mut tree.arena)
            } else {
                parent.checked_append(child, &mut tree.arena)
            };
            result.map_err(|e| DomError::HierarchyRequest(e.to_string()))?;
            records.push(MutationRecord::ChildList { target: parent });
        }
        self.notify(records);
        Ok(())
    }

    /// Build `spec` and append it under `parent`, returning the new subtree root.
    pub fn append_spec(&self, parent: NodeId, spec: &ElementSpec) -> Result<NodeId, DomError> {
        let node = {
            let mut tree = self.tree.write();
            let node = tree.build(spec);
            tree.check_insertion(parent, node)?;
            parent
                .checked_append(node, &mut tree.arena)
                .map_err(|e| DomError::HierarchyRequest(e.to_string()))?;
            node
        };
        self.notify(vec![MutationRecord::ChildList { target: parent }]);
        Ok(node)
    }

    /// Detach `node` from its parent. Returns false if it was not attached.
    pub fn remove(&self, node: NodeId) -> bool {
        let parent = {
            let mut tree = self.tree.write();
            if !tree.exists(node) {
                return false;
            }
            tree.detach(node)
        };
        match parent {
            Some(parent) => {
                self.notify(vec![MutationRecord::ChildList { target: parent }]);
                true
            }
            None => false,
        }
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&self, parent: NodeId) {
        let removed = {
            let mut tree = self.tree.write();
            let children = tree.children(parent);
            for &child in &children {
                tree.detach(child);
            }
            !children.is_empty()
        };
        if removed {
            self.notify(vec![MutationRecord::ChildList { target: parent }]);
        }
    }

    /// Free the detached subtrees holding `nodes`.
    ///
    /// Connected nodes are left alone. Ids inside a freed subtree no longer
    /// resolve. Returns how many subtrees were freed.
    pub fn prune(&self, nodes: impl IntoIterator<Item = NodeId>) -> usize {
        let mut tree = self.tree.write();
        let mut freed = 0;
        for node in nodes {
            if let Some(top) = tree.detached_root(node) {
                top.remove_subtree(&mut tree.arena);
                freed += 1;
            }
        }
        if freed > 0 {
            trace!(freed, "pruned detached subtrees");
        }
        freed
    }

    /// Live nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.tree
            .read()
            .arena
            .iter()
            .filter(|node| !node.is_removed())
            .count()
    }

    /// Replace the children of `parent` with the subtree built from `spec`.
    pub fn replace_children_with_spec(
        &self,
        parent: NodeId,
        spec: &ElementSpec,
    ) -> Result<NodeId, DomError> {
        self.clear_children(parent);
        self.append_spec(parent, spec)
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&self, node: NodeId, text: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.write();
            match tree.kind(node) {
                None => return Err(DomError::NodeNotFound),
                Some(NodeKind::Text(_)) => {
                    if let Some(n) = tree.arena.get_mut(node) {
                        *n.get_mut() = NodeKind::Text(text.to_string());
                    }
                    return Ok(());
                }
                Some(_) => {}
            }
            for child in tree.children(node) {
                tree.detach(child);
            }
            let text_node = tree.arena.new_node(NodeKind::Text(text.to_string()));
            node.checked_append(text_node, &mut tree.arena)
                .map_err(|e| DomError::HierarchyRequest(e.to_string()))?;
        }
        self.notify(vec![MutationRecord::ChildList { target: node }]);
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.read().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.read().children(node)
    }

    /// Whether `node` is still reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.read().is_connected(node)
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.read().contains(ancestor, node)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.tree.read().element(node).is_some()
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.read().element(node).map(|e| e.tag.clone())
    }

    // Attributes and style

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.read();
        let element = tree.element(node)?;
        if name == "style" && !element.style.is_empty() {
            return Some(element.style_text());
        }
        element.attr(name).map(str::to_string)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        let changed = {
            let mut tree = self.tree.write();
            match tree.element_mut(node) {
                Some(element) if name == "style" => {
                    element.style = parse_style(value);
                    true
                }
                Some(element) => element.set_attr(name, value),
                None => false,
            }
        };
        if changed {
            self.notify(vec![MutationRecord::Attribute {
                target: node,
                name: name.to_string(),
            }]);
        }
    }

    pub fn remove_attr(&self, node: NodeId, name: &str) {
        let changed = {
            let mut tree = self.tree.write();
            match tree.element_mut(node) {
                Some(element) if name == "style" => {
                    let had_style = !element.style.is_empty();
                    element.style.clear();
                    element.remove_attr(name) || had_style
                }
                Some(element) => element.remove_attr(name),
                None => false,
            }
        };
        if changed {
            self.notify(vec![MutationRecord::Attribute {
                target: node,
                name: name.to_string(),
            }]);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .read()
            .element(node)
            .is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        let updated = self.tree.read().element(node).and_then(|e| {
            (!e.has_class(class)).then(|| e.classes().chain([class]).collect::<Vec<_>>().join(" "))
        });
        if let Some(updated) = updated {
            self.set_attr(node, "class", &updated);
        }
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        let updated = self.tree.read().element(node).and_then(|e| {
            e.has_class(class)
                .then(|| e.classes().filter(|c| *c != class).collect::<Vec<_>>().join(" "))
        });
        if let Some(updated) = updated {
            self.set_attr(node, "class", &updated);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree
            .read()
            .element(node)?
            .style
            .get(property)
            .cloned()
    }

    /// Set an inline style property; an empty value removes it.
    pub fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let changed = {
            let mut tree = self.tree.write();
            match tree.element_mut(node) {
                Some(element) if value.is_empty() => element.style.remove(property).is_some(),
                Some(element) => {
                    element.style.insert(property.to_string(), value.to_string())
                        != Some(value.to_string())
                }
                None => false,
            }
        };
        if changed {
            self.notify(vec![MutationRecord::Attribute {
                target: node,
                name: "style".to_string(),
            }]);
        }
    }

    // Content and layout

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.read().text_content(node)
    }

    pub fn scroll_height(&self) -> u32 {
        self.tree.read().scroll_height
    }

    /// Record a new content height, as layout would after a re-render.
    pub fn set_scroll_height(&self, height: u32) {
        let changed = {
            let mut tree = self.tree.write();
            let changed = tree.scroll_height != height;
            tree.scroll_height = height;
            changed
        };
        if changed {
            self.notify(vec![MutationRecord::Resize { height }]);
        }
    }

    // Form controls

    /// Current value of a form control, following browser defaults
    /// (`"on"` for valueless radios and checkboxes, option text for
    /// valueless options).
    pub fn value(&self, node: NodeId) -> Option<String> {
        self.tree.read().value(node)
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.tree.read().element(node).is_some_and(|e| e.checked)
    }

    /// Set checkedness without dispatching events.
    pub fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(element) = self.tree.write().element_mut(node) {
            element.checked = checked;
        }
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.tree
            .read()
            .element(node)
            .is_some_and(ElementData::is_disabled)
    }

    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.tree.read().options(select)
    }

    pub fn selected_index(&self, select: NodeId) -> Option<usize> {
        self.tree.read().selected_index(select)
    }

    /// Select an option without dispatching events.
    pub fn set_selected_index(&self, select: NodeId, index: Option<usize>) {
        self.tree.write().select_option(select, index);
    }

    // User interaction

    /// Simulate the user clicking a radio or checkbox.
    ///
    /// Radios uncheck the other radios of their group (same `name` within
    /// the same form). Returns whether a `change` event fired.
    pub fn check(&self, input: NodeId) -> bool {
        let changed = {
            let mut tree = self.tree.write();
            let Some(element) = tree.element(input) else {
                return false;
            };
            if element.tag != "input" || element.is_disabled() {
                return false;
            }
            let input_type = element.input_type();
            let was_checked = element.checked;
            let name = element.attr("name").map(str::to_string);

            match input_type.as_str() {
                "radio" if was_checked => false,
                "radio" => {
                    if let Some(name) = name {
                        let scope = tree.nearest_tag(input, "form").unwrap_or(tree.root);
                        let group: Vec<NodeId> = tree
                            .descendants(scope)
                            .into_iter()
                            .filter(|&id| {
                                tree.element(id).is_some_and(|e| {
                                    e.tag == "input"
                                        && e.input_type() == "radio"
                                        && e.attr("name") == Some(name.as_str())
                                })
                            })
                            .collect();
                        for id in group {
                            if let Some(e) = tree.element_mut(id) {
                                e.checked = false;
                            }
                        }
                    }
                    if let Some(e) = tree.element_mut(input) {
                        e.checked = true;
                    }
                    true
                }
                "checkbox" => {
                    if let Some(e) = tree.element_mut(input) {
                        e.checked = !was_checked;
                    }
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.dispatch(DomEventKind::Change, input);
        }
        changed
    }

    /// Simulate the user picking option `index` of a select.
    ///
    /// Disabled options and re-picking the current option do not fire
    /// `change`. Returns whether an event fired.
    pub fn choose_option(&self, select: NodeId, index: usize) -> bool {
        let changed = {
            let mut tree = self.tree.write();
            let options = tree.options(select);
            let Some(&option) = options.get(index) else {
                return false;
            };
            if tree.element(select).is_none_or(ElementData::is_disabled)
                || tree.element(option).is_none_or(ElementData::is_disabled)
                || tree.selected_index(select) == Some(index)
            {
                return false;
            }
            tree.select_option(select, Some(index));
            true
        };
        if changed {
            self.dispatch(DomEventKind::Change, select);
        }
        changed
    }

    /// Pick the first option whose trimmed text equals `text`.
    pub fn choose_option_by_text(&self, select: NodeId, text: &str) -> bool {
        let index = {
            let tree = self.tree.read();
            tree.options(select)
                .iter()
                .position(|&id| tree.text_content(id).trim() == text)
        };
        index.is_some_and(|i| self.choose_option(select, i))
    }

    /// Simulate submitting `form`.
    pub fn submit(&self, form: NodeId) -> bool {
        if !self.is_element(form) {
            return false;
        }
        self.dispatch(DomEventKind::Submit, form);
        true
    }

    // Queries

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.tree.read().query(scope, selector)
    }

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_selector_all(scope, selector).into_iter().next()
    }

    /// Parse and run a selector under `scope`.
    pub fn select_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.query_selector_all(scope, &selector))
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(&*self.tree.read(), node)
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.tree.read().closest(node, selector)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
