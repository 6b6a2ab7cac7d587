//! Core error types.
//!
//! Only construction from configuration can fail; runtime conditions such
//! as a missing widget are reported through `Option` and logging.

use quickview_dom::SelectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid selector '{selector}': {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

impl CoreError {
    pub fn invalid_selector(selector: &str, source: SelectorError) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            source,
        }
    }
}

/// Parse a selector, attaching the source text to the error.
pub(crate) fn parse_selector(selector: &str) -> Result<quickview_dom::Selector, CoreError> {
    quickview_dom::Selector::parse(selector).map_err(|e| CoreError::invalid_selector(selector, e))
}
