//! SKU resolution.
//!
//! The bundle code layout is a contract with the catalog:
//! `BUNDLE-<count digits>-SKU-<part slug>...-COMPLETE`.

use quickview_protocols::{Path, SelectionState, StepRole};

/// Resolve the SKU for the active path.
///
/// Returns `None` until every selection the path needs is present:
/// count and strategy for [`Path::Custom`], plus the bundle for
/// [`Path::Predesigned`]. A custom build keeps the count's own catalog
/// SKU.
pub fn resolve(selections: &SelectionState, path: Path) -> Option<String> {
    let count = selections.role(StepRole::Count)?;
    selections.role(StepRole::Strategy)?;

    match path {
        Path::Custom => Some(count.primary().to_string()),
        Path::Predesigned => {
            let bundle = selections.role(StepRole::Bundle)?;
            let digits: String = count.primary().chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            let slugs: Vec<String> = bundle.parts().iter().map(|part| slug(part)).collect();
            Some(format!("BUNDLE-{}-SKU-{}-COMPLETE", digits, slugs.join("-")))
        }
    }
}

/// Lower-case with each whitespace run replaced by one hyphen.
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.extend(c.to_lowercase());
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selections(count: &str, strategy: &str) -> SelectionState {
        SelectionState::new()
            .with(StepRole::Count, count)
            .with(StepRole::Strategy, strategy)
    }

    #[test]
    fn test_custom_passes_count_through() {
        let state = selections("12-SKU-HARDWARE-KIT", "Custom Build");
        assert_eq!(
            resolve(&state, Path::Custom).as_deref(),
            Some("12-SKU-HARDWARE-KIT")
        );
    }

    #[test]
    fn test_predesigned_bundle_code() {
        let state = selections("16", "Pre-designed").with(StepRole::Bundle, vec!["Wall Mount", "Walnut"]);
        assert_eq!(
            resolve(&state, Path::Predesigned).as_deref(),
            Some("BUNDLE-16-SKU-wall-mount-walnut-COMPLETE")
        );
    }

    #[test]
    fn test_predesigned_uses_count_digits_only() {
        let state = selections("24 SKU kit", "Pre-designed")
            .with(StepRole::Bundle, vec!["Floor  Stand", "Matte\tBlack"]);
        assert_eq!(
            resolve(&state, Path::Predesigned).as_deref(),
            Some("BUNDLE-24-SKU-floor-stand-matte-black-COMPLETE")
        );
    }

    #[test]
    fn test_incomplete_selections_resolve_to_none() {
        let count_only = SelectionState::new().with(StepRole::Count, "16");
        assert_eq!(resolve(&count_only, Path::Custom), None);

        let no_bundle = selections("16", "Pre-designed");
        assert_eq!(resolve(&no_bundle, Path::Predesigned), None);
    }

    #[test]
    fn test_count_without_digits_has_no_bundle_code() {
        let state = selections("Dozen", "Pre-designed").with(StepRole::Bundle, "Wall Mount");
        assert_eq!(resolve(&state, Path::Predesigned), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let state = selections("16", "Pre-designed").with(StepRole::Bundle, vec!["Wall Mount", "Oak"]);
        assert_eq!(resolve(&state, Path::Predesigned), resolve(&state.clone(), Path::Predesigned));
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Wall Mount"), "wall-mount");
        assert_eq!(slug("Matte   Black"), "matte-black");
        assert_eq!(slug("Oak"), "oak");
    }
}
