//! Fractional-Kelly stake math. This is the single source of truth for unit
//! sizing; it runs after the reasoning call and unconditionally overwrites
//! whatever stake the model proposed, because structured-output reasoning
//! cannot be trusted with closed-form arithmetic.

use market_model::odds::decimal_odds_for_price;
use market_model::BetRecommendation;

use crate::policy::StakePolicy;

/// Stake in units for a projected win probability at given decimal odds.
/// Returns 0.0 whenever the edge is non-positive, regardless of what the
/// upstream model claimed.
pub fn fractional_kelly_units(
    projected_prob: f64,
    decimal_odds: f64,
    fraction: f64,
    max_units: f64,
) -> f64 {
    if decimal_odds <= 1.0 {
        return 0.0;
    }

    let edge = projected_prob * decimal_odds - 1.0;
    if edge <= 0.0 {
        return 0.0;
    }

    let full_kelly = edge / (decimal_odds - 1.0);
    let units = (full_kelly * fraction * 100.0).round() / 100.0;
    units.min(max_units)
}

/// Pure stage: returns the recommendation with `recommended_units` replaced
/// by the policy's Kelly value for the stated price and projected probability.
pub fn size_stake(mut rec: BetRecommendation, policy: &StakePolicy) -> BetRecommendation {
    let decimal_odds = decimal_odds_for_price(rec.american_price);
    rec.recommended_units = fractional_kelly_units(
        rec.ev_analysis.projected_win_probability,
        decimal_odds,
        policy.kelly_fraction,
        policy.max_units,
    );
    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stake_on_non_positive_edge() {
        // p=0.50 at -110 is -EV.
        assert_eq!(fractional_kelly_units(0.50, 1.9091, 0.25, 3.0), 0.0);
        // Exactly break-even is still a pass.
        assert_eq!(fractional_kelly_units(0.5238, 1.9091, 0.25, 3.0), 0.0);
        // Degenerate odds never stake.
        assert_eq!(fractional_kelly_units(0.99, 1.0, 0.25, 3.0), 0.0);
    }

    #[test]
    fn positive_edge_stakes_within_cap() {
        // p=0.54 at -110: edge ~= 0.0309.
        let units = fractional_kelly_units(0.54, 1.9091, 0.25, 3.0);
        assert!(units > 0.0);
        assert!(units <= 3.0);
        // full_kelly ~= 0.034, quarter ~= 0.0085 -> rounds to 0.01.
        assert!((units - 0.01).abs() < 1e-9);
    }

    #[test]
    fn monotone_in_edge_for_fixed_odds() {
        let mut last = 0.0;
        for p in [0.53, 0.56, 0.60, 0.70, 0.85, 0.99] {
            let units = fractional_kelly_units(p, 1.9091, 0.25, 3.0);
            assert!(units >= last, "stake fell as edge rose at p={p}");
            last = units;
        }
    }

    #[test]
    fn cap_binds_extreme_inputs() {
        let units = fractional_kelly_units(0.999, 11.0, 1.0, 3.0);
        assert_eq!(units, 3.0);
        assert!(fractional_kelly_units(1.0, 101.0, 1.0, 0.5) <= 0.5);
    }
}
