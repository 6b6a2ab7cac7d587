//! Document model for the page rendered inside the quick view iframe.
//!
//! The embedded widget owns this markup and may replace it at any time, so
//! the model mirrors the parts of the browser DOM the configurator relies
//! on:
//!
//! - an arena tree whose removed nodes stay addressable but disconnected
//! - attributes, classes, inline style, and form-control state
//! - a CSS selector subset (`tag`, `#id`, `.class`, `[attr]`, `[attr=v]`,
//!   `:checked`, `:disabled`, `:not(...)`, descendant and child combinators,
//!   selector lists)
//! - delegated `change`/`submit` events and mutation records, both
//!   broadcast to any number of listeners
//! - a serde fixture format ([`ElementSpec`]) for building widget markup

mod document;
mod error;
mod events;
mod fixture;
mod node;
mod selector;

pub use document::Document;
pub use error::{DomError, SelectorError};
pub use events::{DomEvent, DomEventKind, MutationRecord};
pub use fixture::ElementSpec;
pub use indextree::NodeId;
pub use node::{ElementData, NodeKind};
pub use selector::Selector;
