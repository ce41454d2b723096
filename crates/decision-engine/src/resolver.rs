//! Slate-level conflict resolution. Each market side is reasoned about by an
//! independent model call, so near a pick'em both sides can clear the EV bar.
//! Betting both sides of one market can never be sound at positive combined
//! edge, so the lower-EV entry is suppressed deterministically.

use std::collections::HashMap;

use market_model::{BetType, DailySlate};
use tracing::warn;

/// Marker prepended to the summary of a suppressed entry; numeric fields are
/// left intact for audit.
pub const SUPPRESSED_MARKER: &str = "[suppressed: opposite side also +EV]";

/// Pure stage: enforces that no (game_id, bet_type) pair keeps two
/// recommended entries, then recomputes total units at risk.
pub fn resolve_slate(mut slate: DailySlate) -> DailySlate {
    let mut groups: HashMap<(String, BetType), Vec<usize>> = HashMap::new();
    for (idx, bet) in slate.bets.iter().enumerate() {
        if bet.is_recommended {
            groups
                .entry((bet.game_id.clone(), bet.bet_type))
                .or_default()
                .push(idx);
        }
    }

    for ((game_id, bet_type), mut members) in groups {
        if members.len() < 2 {
            continue;
        }

        // Highest stated EV survives; stable sort keeps insertion order on ties.
        members.sort_by(|&a, &b| {
            slate.bets[b]
                .expected_value()
                .partial_cmp(&slate.bets[a].expected_value())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        warn!(
            game_id = %game_id,
            bet_type = %bet_type,
            conflicting = members.len(),
            "both sides flagged +EV; keeping highest-EV entry"
        );

        for &idx in &members[1..] {
            let bet = &mut slate.bets[idx];
            bet.is_recommended = false;
            bet.summary = format!("{SUPPRESSED_MARKER} {}", bet.summary);
        }
    }

    slate.recompute_units_at_risk();
    slate
}
