//! `replay` subcommand.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use quickview_bridge::{replay, HostHooks, Scenario};
use quickview_config::Config;
use quickview_protocols::{Path as BuildPath, SelectionReport, WireMessage};

/// Host hooks that log what a real page would do.
struct LoggingHooks;

impl HostHooks for LoggingHooks {
    fn on_selection(&self, selection: &SelectionReport) {
        info!(component = %selection.component, value = %selection.value, "analytics: selection");
    }

    fn on_sku_swap(&self, sku: &str, path: BuildPath) {
        info!(sku, path = %path, "page: swap displayed SKU");
    }

    fn on_add_to_cart(&self, product_id: Option<&str>, sku: Option<&str>, _path: Option<BuildPath>) {
        info!(product_id = ?product_id, sku = ?sku, "page: add to cart");
    }
}

/// Replay a scenario file and print every message the overlay received.
pub(crate) async fn replay_scenario(config: &Config, path: &Path, format: &str) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = Scenario::from_json(&text)?;

    let report = replay(&scenario, config, Arc::new(LoggingHooks)).await?;

    match format {
        "text" => {
            println!("src:       {}", report.src);
            println!("detection: {:?}", report.detection);
            println!("{}", "-".repeat(60));
            for message in &report.messages {
                println!("{:<15} {}", message.action(), serde_json::to_string(&message.to_wire()?)?);
            }
            println!("{}", "-".repeat(60));
            match &report.last_sku {
                Some((sku, path)) => println!("sku:       {} ({})", sku, path),
                None => println!("sku:       -"),
            }
            if let Some(height) = report.modal.iframe_height {
                println!("height:    {}", height);
            }
        }
        _ => {
            for message in &report.messages {
                println!("{}", serde_json::to_string(&message.to_wire()?)?);
            }
        }
    }

    Ok(())
}
