//! Pre-filter ranking applied before any reasoning calls. Each call has real
//! API cost, so the slate is capped to the games most worth analyzing. A
//! lower-ranked game might still have been +EV; it is simply never evaluated.

use market_model::Game;
use tracing::info;

use crate::selector::select_markets;

/// Lexicographic score: sides with stats available first, then the summed
/// American prices of the markets the selector would actually submit
/// (higher sum = less juice).
pub fn rank_score(game: &Game) -> (u8, i64) {
    let stats_score = game.stats_coverage();

    let pricing_score: i64 = select_markets(game)
        .into_iter()
        .filter_map(|(bet_type, side)| game.odds_for(bet_type, side))
        .map(|odds| i64::from(odds.american_price))
        .sum();

    (stats_score, pricing_score)
}

/// Sorts games by descending rank score and keeps the top `max_games`.
pub fn rank_and_cap(mut games: Vec<Game>, max_games: usize) -> Vec<Game> {
    let total = games.len();
    games.sort_by(|a, b| rank_score(b).cmp(&rank_score(a)));
    games.truncate(max_games);
    info!(total, analyzing = games.len(), "ranked slate candidates");
    games
}
