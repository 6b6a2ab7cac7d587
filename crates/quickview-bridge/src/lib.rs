//! # Quick View Bridge
//!
//! Both ends of the quick view frame boundary.
//!
//! - [`IframeRuntime`] runs inside the embedded product page: it drives the
//!   [`StepEngine`](quickview_core::StepEngine) from DOM events and reports
//!   selections, SKUs, heights and cart submissions to the parent.
//! - [`ModalController`] runs in the host page: it opens the overlay, sends
//!   `init` on load and hands inbound messages to [`HostHooks`].
//! - [`window_pair`] links two in-process documents with browser
//!   `postMessage` origin rules.
//!
//! Each side drops messages whose origin differs from its own.

pub mod error;
pub mod iframe;
pub mod links;
pub mod modal;
pub mod scenario;
pub mod window;

pub use error::BridgeError;
pub use iframe::{Detection, IframeHandle, IframeRuntime};
pub use modal::{HostHooks, ModalController, ModalState, NoopHooks};
pub use scenario::{replay, Action, ReplayReport, Scenario};
pub use window::{window_pair, Window, ANY_ORIGIN};
