//! Reasoning adapter: builds the structured request for one
//! (game, market, side) triple, calls the reasoning model, and re-validates
//! its structured response before anything downstream trusts it.

pub mod client;
pub mod prompt;
pub mod types;

pub use client::{Analyst, EvClient};
pub use types::{
    enforce_request_identity, validate_recommendation, AnalysisError, AnalysisRequest,
};
