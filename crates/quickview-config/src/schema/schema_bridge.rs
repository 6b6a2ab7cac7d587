//! Frame bridge and logging configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Frame bridge configuration, shared by the overlay and the iframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Site home URL; numeric product ids open `<home>/?p=<id>`.
    #[serde(default = "default_home")]
    pub home: String,

    /// Query parameter switching the product page into quick view layout.
    #[serde(default = "default_qv_param")]
    pub qv_param: String,

    /// Parameter used instead of `qv_param` for staging URLs.
    #[serde(default = "default_staging_param")]
    pub staging_param: String,

    #[serde(default = "default_true")]
    pub enable_sku_swap: bool,

    #[serde(default = "default_true")]
    pub enable_analytics: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            qv_param: default_qv_param(),
            staging_param: default_staging_param(),
            enable_sku_swap: true,
            enable_analytics: true,
        }
    }
}

fn default_home() -> String {
    "http://localhost/".to_string()
}

fn default_qv_param() -> String {
    "tpb_qv".to_string()
}

fn default_staging_param() -> String {
    "tpb_qv_staging".to_string()
}

/// Logging configuration for the command line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            log_dir: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
