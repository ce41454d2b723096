//! Deterministic post-processing for reasoning-model output: fractional-Kelly
//! stake sizing, the recommendation quality gate, and slate-level conflict
//! resolution. Every stage is a pure value-in/value-out transformation; the
//! fixed order is sizing -> gate -> (slate-level) resolver.

pub mod gate;
pub mod kelly;
pub mod policy;
pub mod resolver;

pub use gate::apply_quality_gate;
pub use kelly::{fractional_kelly_units, size_stake};
pub use policy::StakePolicy;
pub use resolver::resolve_slate;

use market_model::BetRecommendation;

/// Per-recommendation pipeline: overwrite the model-suggested stake with the
/// closed-form Kelly value, then enforce the quality thresholds.
pub fn finalize_recommendation(
    rec: BetRecommendation,
    policy: &StakePolicy,
) -> BetRecommendation {
    apply_quality_gate(size_stake(rec, policy), policy)
}
