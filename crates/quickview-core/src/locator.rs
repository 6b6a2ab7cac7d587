//! Step detection.

use quickview_config::{LocatorConfig, RolesConfig};
use quickview_dom::{Document, NodeId, Selector};
use quickview_protocols::StepRole;
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::error::{parse_selector, CoreError};

/// A configuration step found in the widget's markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Position in document order.
    pub index: usize,
    pub role: StepRole,
    pub container: NodeId,
    /// Display title, used in logs and selection reports.
    pub title: String,
}

/// Infers step roles from container text.
///
/// The widget carries no role metadata, so roles come from matching the
/// container's copy against two case-insensitive patterns.
#[derive(Debug, Clone)]
pub struct RoleMatcher {
    strategy: Regex,
    bundle: Regex,
}

impl RoleMatcher {
    pub fn new(strategy_pattern: &str, bundle_pattern: &str) -> Result<Self, CoreError> {
        Ok(Self {
            strategy: compile("roles.strategy_pattern", strategy_pattern)?,
            bundle: compile("roles.bundle_pattern", bundle_pattern)?,
        })
    }

    pub fn from_config(config: &RolesConfig) -> Result<Self, CoreError> {
        Self::new(&config.strategy_pattern, &config.bundle_pattern)
    }

    /// Role of the container at `position`.
    ///
    /// The first step is always the base count. Otherwise a legacy
    /// `data-component` name wins over text matching.
    pub fn infer(&self, position: usize, component: Option<&str>, text: &str) -> StepRole {
        if position == 0 {
            return StepRole::Count;
        }
        if let Some(role) = component.and_then(Self::legacy_role) {
            return role;
        }
        if self.strategy.is_match(text) {
            StepRole::Strategy
        } else if self.bundle.is_match(text) {
            StepRole::Bundle
        } else {
            StepRole::Unknown
        }
    }

    /// Role for a legacy `data-component` name.
    pub fn legacy_role(component: &str) -> Option<StepRole> {
        match component {
            "sku-count" => Some(StepRole::Count),
            "build-strategy" => Some(StepRole::Strategy),
            "mount-type" | "finish-material" | "bundle" => Some(StepRole::Bundle),
            _ => None,
        }
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, CoreError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CoreError::InvalidPattern {
            field: field.to_string(),
            source,
        })
}

/// Finds step containers using ordered fallback strategies.
///
/// The first strategy with at least one match wins; results from different
/// strategies are never mixed, since each corresponds to a different widget
/// template.
#[derive(Debug, Clone)]
pub struct ComponentLocator {
    strategies: Vec<Selector>,
    title: Selector,
    roles: RoleMatcher,
}

impl ComponentLocator {
    pub fn new(locator: &LocatorConfig, roles: &RolesConfig) -> Result<Self, CoreError> {
        let strategies = locator
            .strategies
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            strategies,
            title: parse_selector(&locator.title_selector)?,
            roles: RoleMatcher::from_config(roles)?,
        })
    }

    /// Ordered steps under `root`; empty when the widget has not rendered.
    pub fn locate(&self, doc: &Document, root: NodeId) -> Vec<Step> {
        let Some((strategy, containers)) = self.containers(doc, root) else {
            trace!("no strategy matched");
            return Vec::new();
        };
        debug!(strategy = %strategy, count = containers.len(), "located step containers");

        containers
            .into_iter()
            .enumerate()
            .map(|(index, container)| {
                let component = doc.attr(container, "data-component");
                let role = self
                    .roles
                    .infer(index, component.as_deref(), &doc.text_content(container));
                Step {
                    index,
                    role,
                    container,
                    title: self.title_of(doc, container, index),
                }
            })
            .collect()
    }

    fn containers<'a>(&'a self, doc: &Document, root: NodeId) -> Option<(&'a Selector, Vec<NodeId>)> {
        self.strategies.iter().find_map(|strategy| {
            let found = doc.query_selector_all(root, strategy);
            // Keep outermost matches only; a nested match is part of its ancestor's step.
            let outermost: Vec<NodeId> = found
                .iter()
                .copied()
                .filter(|&node| {
                    !found
                        .iter()
                        .any(|&other| other != node && doc.contains(other, node))
                })
                .collect();
            (!outermost.is_empty()).then_some((strategy, outermost))
        })
    }

    fn title_of(&self, doc: &Document, container: NodeId, index: usize) -> String {
        doc.query_selector(container, &self.title)
            .map(|node| doc.text_content(node).trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| format!("Component {}", index + 1))
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
