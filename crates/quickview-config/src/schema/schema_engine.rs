//! Step engine timing and presentation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Step engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Delays between widget detection attempts. One immediate attempt is
    /// made first, so the total budget is `len + 1` attempts.
    #[serde(default = "default_retry_delays")]
    pub retry_delays_ms: Vec<u64>,

    /// How long DOM and height observers stay attached.
    #[serde(default = "default_observation_window")]
    pub observation_window_ms: u64,

    /// Delay of the first height report.
    #[serde(default = "default_initial_resize_delay")]
    pub initial_resize_delay_ms: u64,

    #[serde(default = "default_collapsed_class")]
    pub collapsed_class: String,

    #[serde(default = "default_collapsed_max_height")]
    pub collapsed_max_height: String,

    #[serde(default = "default_collapsed_opacity")]
    pub collapsed_opacity: String,
}

impl EngineConfig {
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    pub fn retry_budget(&self) -> Duration {
        Duration::from_millis(self.retry_delays_ms.iter().sum())
    }

    pub fn observation_window(&self) -> Duration {
        Duration::from_millis(self.observation_window_ms)
    }

    pub fn initial_resize_delay(&self) -> Duration {
        Duration::from_millis(self.initial_resize_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_delays_ms: default_retry_delays(),
            observation_window_ms: default_observation_window(),
            initial_resize_delay_ms: default_initial_resize_delay(),
            collapsed_class: default_collapsed_class(),
            collapsed_max_height: default_collapsed_max_height(),
            collapsed_opacity: default_collapsed_opacity(),
        }
    }
}

fn default_retry_delays() -> Vec<u64> {
    vec![150, 400, 1000]
}

fn default_observation_window() -> u64 {
    30_000
}

fn default_initial_resize_delay() -> u64 {
    100
}

fn default_collapsed_class() -> String {
    "tpb-collapsed".to_string()
}

fn default_collapsed_max_height() -> String {
    "60px".to_string()
}

fn default_collapsed_opacity() -> String {
    "0.6".to_string()
}
