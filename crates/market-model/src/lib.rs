//! Shared domain types for the Hoops Edge CBB betting pipeline.

pub mod error;
pub mod odds;
pub mod types;

pub use error::ModelError;
pub use odds::Odds;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ModelError>;
