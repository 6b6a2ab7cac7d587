//! Progressive disclosure state machine.
//!
//! One engine per mounted widget. Step N is visible only when step N-1
//! holds a value (step 0 is always visible after initialization). Reveal is
//! forward-only: changing an already-passed step to another value does not
//! collapse later steps.

use quickview_config::{Config, EngineConfig};
use quickview_dom::{Document, DomEvent, DomEventKind, NodeId};
use quickview_protocols::{Path, SelectionKey, SelectionReport, SelectionState, SelectionValue, StepRole};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::locator::{ComponentLocator, Step};
use crate::reset::SelectionResetter;
use crate::selection::SelectionReader;
use crate::sku;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Collapsed,
}

/// Something the engine did, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Steps were located and initialized.
    Mounted { steps: usize },
    /// Tracked containers left the document; all state was dropped.
    Unmounted,
    Revealed { index: usize },
    Collapsed { index: usize },
    PathChanged { path: Path },
    /// A step now holds a value.
    Selection(SelectionReport),
    /// The resolved SKU appeared or changed.
    Sku { sku: String, path: Path },
}

/// How collapsed steps are presented.
#[derive(Debug, Clone)]
struct StepStyle {
    class: String,
    max_height: String,
    opacity: String,
}

impl StepStyle {
    fn from_config(config: &EngineConfig) -> Self {
        Self {
            class: config.collapsed_class.clone(),
            max_height: config.collapsed_max_height.clone(),
            opacity: config.collapsed_opacity.clone(),
        }
    }

    fn apply(&self, doc: &Document, container: NodeId, visibility: Visibility) {
        match visibility {
            Visibility::Visible => {
                doc.remove_class(container, &self.class);
                doc.set_style(container, "max-height", "none");
                doc.set_style(container, "overflow", "visible");
                doc.set_style(container, "opacity", "1");
            }
            Visibility::Collapsed => {
                doc.add_class(container, &self.class);
                doc.set_style(container, "max-height", &self.max_height);
                doc.set_style(container, "overflow", "hidden");
                doc.set_style(container, "opacity", &self.opacity);
            }
        }
    }
}

pub struct StepEngine {
    doc: Document,
    root: NodeId,
    locator: ComponentLocator,
    reader: SelectionReader,
    resetter: SelectionResetter,
    style: StepStyle,
    steps: Vec<Step>,
    visibility: Vec<Visibility>,
    selections: SelectionState,
    path: Option<Path>,
    sku: Option<(String, Path)>,
    ever_mounted: bool,
    /// Containers of replaced steps, freed once new steps are mounted.
    stale: Vec<NodeId>,
}

impl StepEngine {
    /// Create an engine scoped to `root`. Nothing is mounted yet.
    pub fn new(doc: Document, root: NodeId, config: &Config) -> Result<Self, CoreError> {
        Ok(Self {
            locator: ComponentLocator::new(&config.locator, &config.roles)?,
            reader: SelectionReader::new()?,
            resetter: SelectionResetter::new(config.roles.placeholders.clone())?,
            style: StepStyle::from_config(&config.engine),
            doc,
            root,
            steps: Vec::new(),
            visibility: Vec::new(),
            selections: SelectionState::new(),
            path: None,
            sku: None,
            ever_mounted: false,
            stale: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn is_mounted(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn visibility(&self, index: usize) -> Option<Visibility> {
        self.visibility.get(index).copied()
    }

    pub fn selections(&self) -> &SelectionState {
        &self.selections
    }

    pub fn path(&self) -> Option<Path> {
        self.path
    }

    /// Last resolved SKU and its path.
    pub fn sku(&self) -> Option<(&str, Path)> {
        self.sku.as_ref().map(|(sku, path)| (sku.as_str(), *path))
    }

    /// Locate steps under the engine's root without touching them.
    pub fn locate(&self) -> Vec<Step> {
        self.locator.locate(&self.doc, self.root)
    }

    /// Value of step `index` as the reader sees it now.
    pub fn read_step(&self, index: usize) -> Option<SelectionValue> {
        let step = self.steps.get(index)?;
        self.reader.read_value(&self.doc, step.container)
    }

    /// Locate and initialize. `None` when the widget has not rendered yet.
    pub fn try_mount(&mut self) -> Option<Vec<EngineEvent>> {
        self.mount_keeping(None)
    }

    fn mount_keeping(&mut self, keep: Option<NodeId>) -> Option<Vec<EngineEvent>> {
        let steps = self.locate();
        if steps.is_empty() {
            debug!("no steps located");
            return None;
        }
        Some(self.initialize_keeping(steps, keep))
    }

    /// Clear every step, show the first and collapse the rest.
    ///
    /// Idempotent on an unchanged document.
    pub fn initialize(&mut self, steps: Vec<Step>) -> Vec<EngineEvent> {
        self.initialize_keeping(steps, None)
    }

    /// Like [`initialize`](Self::initialize), but the step holding `keep`
    /// keeps its current value.
    fn initialize_keeping(&mut self, steps: Vec<Step>, keep: Option<NodeId>) -> Vec<EngineEvent> {
        self.selections.clear();
        self.path = None;
        self.sku = None;
        self.ever_mounted = true;

        self.visibility = steps
            .iter()
            .map(|step| {
                let kept = keep.is_some_and(|node| self.doc.contains(step.container, node));
                if !kept {
                    self.resetter.clear(&self.doc, step.container, step.role);
                }
                let visibility = if step.index == 0 {
                    Visibility::Visible
                } else {
                    Visibility::Collapsed
                };
                self.style.apply(&self.doc, step.container, visibility);
                debug!(index = step.index, role = %step.role, title = %step.title, ?visibility, "initialized step");
                visibility
            })
            .collect();
        self.steps = steps;
        if !self.stale.is_empty() {
            let freed = self.doc.prune(self.stale.drain(..));
            debug!(freed, "released replaced markup");
        }

        info!(steps = self.steps.len(), "progressive disclosure initialized");
        vec![EngineEvent::Mounted {
            steps: self.steps.len(),
        }]
    }

    /// Route a delegated DOM event to the step it happened in.
    ///
    /// A change on markup that replaced the tracked steps remounts first,
    /// keeping the value the user just picked.
    pub fn handle_event(&mut self, event: &DomEvent) -> Vec<EngineEvent> {
        if event.kind != DomEventKind::Change {
            return Vec::new();
        }
        let mut events = self.remount_if_replaced(Some(event.target));
        match self.step_containing(event.target) {
            Some(index) => events.extend(self.on_selection_changed(index)),
            None => debug!(target = ?event.target, "change outside tracked steps"),
        }
        events
    }

    pub fn step_containing(&self, node: NodeId) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| self.doc.contains(step.container, node))
    }

    /// Re-evaluate visibility after step `index` changed.
    pub fn on_selection_changed(&mut self, index: usize) -> Vec<EngineEvent> {
        let Some(step) = self.steps.get(index).cloned() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let value = self.read_step(index);
        self.selections = self.snapshot();

        // A partly filled step (mount chosen, finish not yet) still reports
        // what was picked; only complete values drive reveal.
        let reported = value
            .clone()
            .or_else(|| self.reader.read(&self.doc, step.container).map(SelectionValue::from));
        if let Some(reported) = reported {
            debug!(index, role = %step.role, value = %reported, "selection changed");
            events.push(EngineEvent::Selection(SelectionReport {
                component: step.title.clone(),
                role: step.role,
                index,
                value: reported,
                all_selections: self.selections.clone(),
            }));
        }

        let strategy_path = match (&value, step.role) {
            (Some(value), StepRole::Strategy) => Some(Path::from_strategy(value.primary())),
            _ => None,
        };
        if let Some(path) = strategy_path {
            if self.path != Some(path) {
                info!(path = %path, "build path changed");
                self.path = Some(path);
                events.push(EngineEvent::PathChanged { path });
            }
        }

        if value.is_some() && self.last_visible() == Some(index) {
            let next = index + 1;
            if next < self.steps.len() && self.may_reveal(next) {
                self.set_visibility(next, Visibility::Visible, &mut events);
            }
        }

        if let Some(path) = strategy_path {
            self.apply_path(path, &mut events);
        }

        self.enforce_order(&mut events);
        self.selections = self.snapshot();
        self.update_sku(&mut events);
        events
    }

    /// Check whether the widget replaced its steps and remount if so.
    ///
    /// Called on every observed mutation, and before reading state once
    /// mutations are no longer observed. Before the first successful
    /// mount this does nothing; detection is the retry loop's job.
    pub fn on_mutation(&mut self) -> Vec<EngineEvent> {
        self.remount_if_replaced(None)
    }

    /// Whether every tracked container is still in the document.
    pub fn is_intact(&self) -> bool {
        self.steps
            .iter()
            .all(|step| self.doc.is_connected(step.container))
    }

    fn remount_if_replaced(&mut self, keep: Option<NodeId>) -> Vec<EngineEvent> {
        if !self.ever_mounted {
            return Vec::new();
        }
        if !self.is_mounted() {
            return self.mount_keeping(keep).unwrap_or_default();
        }
        if self.is_intact() {
            return Vec::new();
        }
        info!("step containers replaced, re-initializing");
        self.reset();
        let mut events = vec![EngineEvent::Unmounted];
        events.extend(self.mount_keeping(keep).unwrap_or_default());
        events
    }

    fn reset(&mut self) {
        self.stale.extend(self.steps.drain(..).map(|step| step.container));
        self.visibility.clear();
        self.selections.clear();
        self.path = None;
        self.sku = None;
    }

    fn last_visible(&self) -> Option<usize> {
        self.visibility
            .iter()
            .rposition(|v| *v == Visibility::Visible)
    }

    /// Bundle steps stay closed on the custom path.
    fn may_reveal(&self, index: usize) -> bool {
        !(self.steps[index].role == StepRole::Bundle && self.path == Some(Path::Custom))
    }

    fn apply_path(&mut self, path: Path, events: &mut Vec<EngineEvent>) {
        let bundles: Vec<usize> = self
            .steps
            .iter()
            .filter(|step| step.role == StepRole::Bundle)
            .map(|step| step.index)
            .collect();

        match path {
            Path::Predesigned => {
                let Some(&first) = bundles.first() else {
                    return;
                };
                if first > 0 && self.read_step(first - 1).is_some() {
                    self.set_visibility(first, Visibility::Visible, events);
                }
            }
            Path::Custom => {
                for index in bundles {
                    let step = &self.steps[index];
                    self.resetter.clear(&self.doc, step.container, step.role);
                    self.set_visibility(index, Visibility::Collapsed, events);
                }
            }
        }
    }

    /// Collapse any visible step whose predecessor no longer holds a value.
    fn enforce_order(&mut self, events: &mut Vec<EngineEvent>) {
        for index in 1..self.steps.len() {
            if self.visibility[index] == Visibility::Visible && self.read_step(index - 1).is_none() {
                self.set_visibility(index, Visibility::Collapsed, events);
            }
        }
    }

    fn set_visibility(&mut self, index: usize, visibility: Visibility, events: &mut Vec<EngineEvent>) {
        if self.visibility[index] == visibility {
            return;
        }
        let step = &self.steps[index];
        self.style.apply(&self.doc, step.container, visibility);
        self.visibility[index] = visibility;
        match visibility {
            Visibility::Visible => {
                info!(index, title = %step.title, "revealed step");
                events.push(EngineEvent::Revealed { index });
            }
            Visibility::Collapsed => {
                info!(index, title = %step.title, "collapsed step");
                events.push(EngineEvent::Collapsed { index });
            }
        }
    }

    /// Selections read from the document.
    ///
    /// Bundle steps merge into one `bundle` entry, in DOM order, once every
    /// bundle step holds a value.
    fn snapshot(&self) -> SelectionState {
        let mut state = SelectionState::new();
        let mut bundle_parts = Vec::new();
        let mut bundle_complete = true;

        for step in &self.steps {
            let value = self.reader.read_value(&self.doc, step.container);
            if step.role == StepRole::Bundle {
                match value {
                    Some(value) => bundle_parts.extend(value.parts().iter().cloned()),
                    None => bundle_complete = false,
                }
            } else if let Some(value) = value {
                state.insert(SelectionKey::for_step(step.role, step.index), value);
            }
        }

        if bundle_complete {
            if let Some(bundle) = SelectionValue::from_parts(bundle_parts) {
                state.insert(SelectionKey::Role(StepRole::Bundle), bundle);
            }
        }
        state
    }

    fn update_sku(&mut self, events: &mut Vec<EngineEvent>) {
        let resolved = self
            .path
            .and_then(|path| sku::resolve(&self.selections, path).map(|sku| (sku, path)));
        match resolved {
            Some(current) if self.sku.as_ref() != Some(&current) => {
                info!(sku = %current.0, path = %current.1, "resolved SKU");
                events.push(EngineEvent::Sku {
                    sku: current.0.clone(),
                    path: current.1,
                });
                self.sku = Some(current);
            }
            Some(_) => {}
            None => self.sku = None,
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
