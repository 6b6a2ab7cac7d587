//! `check-config` subcommand.

use std::path::Path;

use quickview_config::{Config, ConfigValidator};

/// Validate the loaded configuration and report problems.
pub(crate) fn check_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if !path.exists() {
        println!("{} not found, checking built-in defaults", path.display());
    }

    let result = ConfigValidator::validate(config)?;
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error:   {}: {}", error.path, error.message);
    }

    let warnings = result.into_result()?;
    println!("configuration ok ({} warnings)", warnings.len());
    Ok(())
}
