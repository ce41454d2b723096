//! Pre-reasoning heuristics: which side of each market to analyze, and which
//! games are worth spending reasoning calls on at all.

pub mod ranker;
pub mod selector;

pub use ranker::{rank_and_cap, rank_score};
pub use selector::select_markets;
