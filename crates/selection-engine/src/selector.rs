//! Picks exactly one side per market type to submit for reasoning. Sending
//! both sides to independent model calls invites two estimates that sum past
//! 100%; picking one side per market removes that failure mode outright, at
//! the cost of never evaluating the worse-priced side.

use market_model::{BetSide, BetType, Game};

/// One (market, side) pair per market type the book actually offers. When
/// both sides are priced, the numerically higher American price wins (less
/// juice); on a tie the away/under side wins. For moneylines this favors the
/// underdog, which is intentional: favorites rarely clear an EV threshold.
pub fn select_markets(game: &Game) -> Vec<(BetType, BetSide)> {
    let mut markets = Vec::with_capacity(3);

    if let Some(pick) = pick_side(
        game,
        BetType::Spread,
        (BetSide::Away, BetSide::Home),
    ) {
        markets.push(pick);
    }
    if let Some(pick) = pick_side(
        game,
        BetType::Total,
        (BetSide::Under, BetSide::Over),
    ) {
        markets.push(pick);
    }
    if let Some(pick) = pick_side(
        game,
        BetType::Moneyline,
        (BetSide::Away, BetSide::Home),
    ) {
        markets.push(pick);
    }

    markets
}

fn pick_side(
    game: &Game,
    bet_type: BetType,
    (preferred, other): (BetSide, BetSide),
) -> Option<(BetType, BetSide)> {
    let preferred_odds = game.odds_for(bet_type, preferred);
    let other_odds = game.odds_for(bet_type, other);
    match (preferred_odds, other_odds) {
        (Some(a), Some(b)) => {
            if a.american_price >= b.american_price {
                Some((bet_type, preferred))
            } else {
                Some((bet_type, other))
            }
        }
        (Some(_), None) => Some((bet_type, preferred)),
        (None, Some(_)) => Some((bet_type, other)),
        (None, None) => None,
    }
}
