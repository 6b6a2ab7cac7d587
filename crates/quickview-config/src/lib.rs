//! # Quick View Config
//!
//! Configuration for the quick view configurator: component locator
//! strategies, role patterns, engine timing, and frame bridge settings.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
