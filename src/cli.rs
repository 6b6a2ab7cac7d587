//! CLI definitions for tpb-quickview.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Quick view configurator tooling.
#[derive(Parser)]
#[command(name = "tpb-quickview")]
#[command(about = "Progressive step disclosure and frame messaging for the quick view configurator")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "config/quickview.toml",
        env = "TPB_QV_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Replay a widget scenario across an in-process frame boundary
    Replay {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Output format (json, text)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Resolve the SKU for a set of selections
    Sku {
        /// COUNT step value, e.g. "16" or "12-SKU-HARDWARE-KIT"
        #[arg(long)]
        count: String,

        /// STRATEGY step value, e.g. "Custom Build" or "Pre-designed"
        #[arg(long)]
        strategy: String,

        /// BUNDLE parts in step order (mount, then finish)
        #[arg(long = "bundle")]
        bundle: Vec<String>,
    },

    /// Validate the configuration file
    CheckConfig,
}
