//! Recommendation quality gate. Three independent suppression conditions,
//! any one of which forces `is_recommended = false`: the EV floor, the
//! noise-stake floor, and the confidence floor. Re-running the gate on an
//! already-suppressed recommendation is a no-op.

use market_model::BetRecommendation;
use tracing::debug;

use crate::policy::StakePolicy;

/// Pure stage: returns the recommendation with the policy thresholds
/// enforced. Numeric analysis fields are never altered, only the
/// recommendation flag and the stake.
pub fn apply_quality_gate(mut rec: BetRecommendation, policy: &StakePolicy) -> BetRecommendation {
    let ev = rec.ev_analysis.expected_value;
    if ev < policy.ev_floor {
        if rec.is_recommended {
            debug!(
                game_id = %rec.game_id,
                bet_type = %rec.bet_type,
                ev,
                floor = policy.ev_floor,
                "suppressing sub-floor EV"
            );
        }
        rec.is_recommended = false;
        rec.recommended_units = 0.0;
    }

    // Covers zero stakes too: a recommendation with nothing to bet is not a
    // recommendation, even when the stated EV clears its floor.
    if rec.recommended_units < policy.unit_floor {
        rec.is_recommended = false;
        rec.recommended_units = 0.0;
    }

    if rec.ev_analysis.confidence < policy.min_confidence {
        rec.is_recommended = false;
        rec.recommended_units = 0.0;
    }

    rec
}
