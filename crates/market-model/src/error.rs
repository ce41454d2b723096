//! Model-level validation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid American price {0}: must be nonzero with magnitude >= 100")]
    InvalidPrice(i32),

    #[error("game {0} has no populated odds slots")]
    NoMarkets(String),
}
