//! DOM errors.

use thiserror::Error;

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected '{found}' at position {position}")]
    Unexpected { found: char, position: usize },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    #[error("Unsupported pseudo-class: {0}")]
    UnsupportedPseudo(String),
}

/// Tree manipulation errors.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found")]
    NodeNotFound,

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),
}
