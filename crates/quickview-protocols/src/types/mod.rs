//! Configuration vocabulary shared by the iframe and the parent.

mod selection;
mod step;

pub use selection::*;
pub use step::*;
