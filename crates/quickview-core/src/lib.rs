//! # Quick View Core
//!
//! Progressive disclosure for a configurator widget whose markup this crate
//! does not control.
//!
//! - [`ComponentLocator`] finds step containers with ordered fallback
//!   selector strategies and infers each step's role.
//! - [`SelectionReader`] reads a step's value from radios, selects, or the
//!   widget's own selection marker.
//! - [`StepEngine`] owns step visibility: step N is shown only once step
//!   N-1 holds a value.
//! - [`sku::resolve`] maps a finished selection set to a catalog SKU.
//! - [`Backoff`] and [`ObservationWindow`] bound how long detection and
//!   observation keep running.

pub mod engine;
pub mod error;
pub mod fixtures;
pub mod locator;
pub mod observer;
pub mod reset;
pub mod retry;
pub mod selection;
pub mod sku;

pub use engine::{EngineEvent, StepEngine, Visibility};
pub use error::CoreError;
pub use locator::{ComponentLocator, RoleMatcher, Step};
pub use observer::{ObservationWindow, Observed};
pub use reset::SelectionResetter;
pub use retry::Backoff;
pub use selection::SelectionReader;
