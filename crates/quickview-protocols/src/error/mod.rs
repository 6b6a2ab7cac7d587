//! Error types for the protocol layer.

mod frame;
mod protocol;

pub use frame::*;
pub use protocol::*;
