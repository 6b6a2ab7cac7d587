//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_bridge;
mod schema_engine;

pub use schema_bridge::*;
pub use schema_engine::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub roles: RolesConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Component locator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Selector groups in priority order. The first group matching at least
    /// one element is used; groups are never merged.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,

    /// Selector for step titles inside a container.
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            title_selector: default_title_selector(),
        }
    }
}

fn default_strategies() -> Vec<String> {
    vec![
        ".af_cp_all_components_content .single_component".to_string(),
        ".af_cp_vertical_template .single_component, .af_cp_toggle_template .single_component"
            .to_string(),
        ".cpb-component, [data-component]".to_string(),
        "select:not([name=\"quantity\"])".to_string(),
    ]
}

fn default_title_selector() -> String {
    "h4.title, h4, .title".to_string()
}

/// Role inference configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesConfig {
    /// Case-insensitive pattern identifying the STRATEGY step.
    #[serde(default = "default_strategy_pattern")]
    pub strategy_pattern: String,

    /// Case-insensitive pattern identifying BUNDLE steps.
    #[serde(default = "default_bundle_pattern")]
    pub bundle_pattern: String,

    #[serde(default)]
    pub placeholders: PlaceholderLabels,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            strategy_pattern: default_strategy_pattern(),
            bundle_pattern: default_bundle_pattern(),
            placeholders: PlaceholderLabels::default(),
        }
    }
}

fn default_strategy_pattern() -> String {
    r"build\s*strategy|pre-?designed|custom build".to_string()
}

fn default_bundle_pattern() -> String {
    r"choose.*complete.*bundle|finish.*material|bundle".to_string()
}

/// Labels of the disabled placeholder option injected into selects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderLabels {
    #[serde(default = "default_count_label")]
    pub count: String,
    #[serde(default = "default_strategy_label")]
    pub strategy: String,
    #[serde(default = "default_bundle_label")]
    pub bundle: String,
    #[serde(default = "default_unknown_label")]
    pub unknown: String,
}

impl Default for PlaceholderLabels {
    fn default() -> Self {
        Self {
            count: default_count_label(),
            strategy: default_strategy_label(),
            bundle: default_bundle_label(),
            unknown: default_unknown_label(),
        }
    }
}

fn default_count_label() -> String {
    "Select SKU count…".to_string()
}

fn default_strategy_label() -> String {
    "Select build strategy…".to_string()
}

fn default_bundle_label() -> String {
    "Select bundle…".to_string()
}

fn default_unknown_label() -> String {
    "Select an option…".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
