//! `sku` subcommand.

use quickview_core::sku;
use quickview_protocols::{Path, SelectionState, SelectionValue, StepRole};

fn selections(count: &str, strategy: &str, bundle: &[String]) -> SelectionState {
    let mut state = SelectionState::new()
        .with(StepRole::Count, count)
        .with(StepRole::Strategy, strategy);
    if let Some(value) = SelectionValue::from_parts(bundle.to_vec()) {
        state = state.with(StepRole::Bundle, value);
    }
    state
}

/// Print the SKU the selections resolve to.
pub(crate) fn resolve_sku(count: &str, strategy: &str, bundle: &[String]) -> anyhow::Result<()> {
    let path = Path::from_strategy(strategy);
    match sku::resolve(&selections(count, strategy, bundle), path) {
        Some(sku) => println!("{}", sku),
        None => anyhow::bail!("selections do not resolve to a SKU on the {} path", path),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_selections() {
        let state = selections("12-SKU-HARDWARE-KIT", "Custom Build", &[]);
        assert_eq!(
            sku::resolve(&state, Path::Custom).as_deref(),
            Some("12-SKU-HARDWARE-KIT")
        );
    }

    #[test]
    fn test_bundle_parts_in_order() {
        let bundle = vec!["Wall Mount".to_string(), "Walnut".to_string()];
        let state = selections("16", "Pre-designed", &bundle);
        assert_eq!(
            sku::resolve(&state, Path::Predesigned).as_deref(),
            Some("BUNDLE-16-SKU-wall-mount-walnut-COMPLETE")
        );
    }

    #[test]
    fn test_missing_bundle_is_unresolved() {
        assert!(resolve_sku("16", "Pre-designed", &[]).is_err());
    }
}
