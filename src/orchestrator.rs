//! Slate orchestrator: ranks and caps the day's games, fans every selected
//! (game, market, side) triple out to the reasoning collaborator
//! concurrently, and folds the survivors into a consistent `DailySlate`.
//! One bad market never aborts the run.

use std::sync::Arc;

use decision_engine::{finalize_recommendation, resolve_slate, StakePolicy};
use ev_agent::{AnalysisRequest, Analyst};
use market_model::{DailySlate, Game};
use selection_engine::{rank_and_cap, select_markets};
use tokio::task::JoinSet;
use tracing::{info, warn};

pub struct SlateOrchestrator<A> {
    analyst: Arc<A>,
    policy: StakePolicy,
    max_games: usize,
}

impl<A: Analyst + 'static> SlateOrchestrator<A> {
    pub fn new(analyst: Arc<A>, policy: StakePolicy, max_games: usize) -> Self {
        Self {
            analyst,
            policy,
            max_games,
        }
    }

    /// Analyzes one day's games into a slate. Always completes: an empty
    /// game list yields an empty slate, and per-triple failures are dropped
    /// with a warning rather than propagated.
    pub async fn analyze_slate(&self, mut games: Vec<Game>, date: String) -> DailySlate {
        // A game with zero odds slots is not an analysis candidate.
        games.retain(|game| {
            if game.has_any_odds() {
                true
            } else {
                warn!(game_id = %game.game_id, "skipping game with no odds");
                false
            }
        });

        let games = rank_and_cap(games, self.max_games);
        let games_analyzed = games.len();

        let mut tasks = JoinSet::new();
        for game in &games {
            for (bet_type, side) in select_markets(game) {
                let request = match AnalysisRequest::new(game.clone(), bet_type, side) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(
                            game_id = %game.game_id,
                            bet_type = %bet_type,
                            side = %side,
                            error = %e,
                            "skipping market"
                        );
                        continue;
                    }
                };

                let analyst = Arc::clone(&self.analyst);
                let policy = self.policy.clone();
                tasks.spawn(async move {
                    match analyst.analyze(&request).await {
                        Ok(rec) => Some(finalize_recommendation(rec, &policy)),
                        Err(e) => {
                            warn!(
                                game_id = %request.game.game_id,
                                bet_type = %request.bet_type,
                                side = %request.side,
                                error = %e,
                                "dropping market after analysis failure"
                            );
                            None
                        }
                    }
                });
            }
        }

        // Completion order is not significant; the slate is insertion order
        // of whichever calls finish first.
        let mut bets = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(rec)) => bets.push(rec),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "analysis task aborted"),
            }
        }

        let slate = resolve_slate(DailySlate::assemble(date, games_analyzed, bets));
        info!(
            date = %slate.date,
            games = slate.games_analyzed,
            bets = slate.bets.len(),
            recommended = slate.recommended().count(),
            units_at_risk = slate.total_units_at_risk,
            "slate assembled"
        );
        slate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ev_agent::AnalysisError;
    use market_model::odds::decimal_odds_for_price;
    use market_model::{
        BetRecommendation, BetSide, BetType, EvAnalysis, Odds, TeamStats,
    };
    use std::sync::Mutex;

    /// Test double: answers every triple with a configurable projected
    /// probability and records what it was asked.
    struct StubAnalyst {
        projected_prob: f64,
        confidence: f64,
        fail_game: Option<String>,
        seen: Mutex<Vec<(String, BetType, BetSide)>>,
    }

    impl StubAnalyst {
        fn new(projected_prob: f64, confidence: f64) -> Self {
            Self {
                projected_prob,
                confidence,
                fail_game: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Analyst for StubAnalyst {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<BetRecommendation, AnalysisError> {
            self.seen.lock().unwrap().push((
                request.game.game_id.clone(),
                request.bet_type,
                request.side,
            ));
            if self.fail_game.as_deref() == Some(request.game.game_id.as_str()) {
                return Err(AnalysisError::Timeout);
            }

            let odds = request.odds();
            let decimal = decimal_odds_for_price(odds.american_price);
            let ev = self.projected_prob * decimal - 1.0;
            Ok(BetRecommendation {
                game_id: request.game.game_id.clone(),
                home_team: request.game.home_team.clone(),
                away_team: request.game.away_team.clone(),
                game_time: request.game.game_time,
                bet_type: request.bet_type,
                side: request.side,
                line: odds.line,
                american_price: odds.american_price,
                ev_analysis: EvAnalysis {
                    bet_type: request.bet_type,
                    side: request.side,
                    reasoning_steps: vec!["a".into(), "b".into(), "c".into()],
                    projected_win_probability: self.projected_prob,
                    implied_probability: odds.implied_probability(),
                    expected_value: ev,
                    confidence: self.confidence,
                },
                // Deliberately wrong; the sizer must overwrite it.
                recommended_units: 4.9,
                is_recommended: true,
                summary: "stub".into(),
            })
        }
    }

    fn stats(id: &str) -> TeamStats {
        TeamStats {
            team_name: id.into(),
            team_id: id.into(),
            record: "20-5".into(),
            offensive_efficiency: Some(115.0),
            defensive_efficiency: Some(95.0),
            pace: Some(68.0),
            three_point_rate: Some(0.36),
            ats_record: None,
            conference: None,
            ranking: None,
            last_updated: None,
        }
    }

    fn game(id: &str, with_stats: bool) -> Game {
        Game {
            game_id: id.into(),
            home_team: format!("{id} home"),
            away_team: format!("{id} away"),
            game_time: Utc::now(),
            home_spread: Some(
                Odds::new(BetType::Spread, BetSide::Home, Some(-3.5), -105).unwrap(),
            ),
            away_spread: Some(
                Odds::new(BetType::Spread, BetSide::Away, Some(3.5), -115).unwrap(),
            ),
            total_over: Some(Odds::new(BetType::Total, BetSide::Over, Some(140.5), -110).unwrap()),
            total_under: Some(
                Odds::new(BetType::Total, BetSide::Under, Some(140.5), -110).unwrap(),
            ),
            home_moneyline: None,
            away_moneyline: None,
            home_stats: with_stats.then(|| stats(id)),
            away_stats: with_stats.then(|| stats(id)),
            injury_notes: None,
        }
    }

    fn orchestrator(analyst: StubAnalyst) -> SlateOrchestrator<StubAnalyst> {
        SlateOrchestrator::new(Arc::new(analyst), StakePolicy::default(), 5)
    }

    #[tokio::test]
    async fn empty_game_list_yields_empty_slate() {
        let orch = orchestrator(StubAnalyst::new(0.65, 0.70));
        let slate = orch.analyze_slate(Vec::new(), "2026-02-14".into()).await;
        assert_eq!(slate.games_analyzed, 0);
        assert!(slate.bets.is_empty());
        assert_eq!(slate.total_units_at_risk, 0.0);
    }

    #[tokio::test]
    async fn positive_edge_markets_are_sized_and_recommended() {
        let orch = orchestrator(StubAnalyst::new(0.65, 0.70));
        let slate = orch
            .analyze_slate(vec![game("g1", true)], "2026-02-14".into())
            .await;

        assert_eq!(slate.games_analyzed, 1);
        // One spread pick + one total pick.
        assert_eq!(slate.bets.len(), 2);
        for bet in &slate.bets {
            assert!(bet.is_recommended);
            // The model's 4.9u suggestion must be gone.
            assert!(bet.recommended_units < 1.0);
            assert!(bet.recommended_units > 0.0);
        }
        let expected: f64 = slate.bets.iter().map(|b| b.recommended_units).sum();
        assert!((slate.total_units_at_risk - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn sub_floor_ev_is_suppressed_not_dropped() {
        // p=0.53 at -105: EV ~= 0.0348, under the 0.035 floor.
        let orch = orchestrator(StubAnalyst::new(0.53, 0.70));
        let slate = orch
            .analyze_slate(vec![game("g1", true)], "2026-02-14".into())
            .await;
        assert_eq!(slate.bets.len(), 2);
        assert_eq!(slate.recommended().count(), 0);
        assert_eq!(slate.total_units_at_risk, 0.0);
    }

    #[tokio::test]
    async fn no_stats_games_never_reach_the_analyst() {
        let analyst = StubAnalyst::new(0.65, 0.70);
        let orch = orchestrator(analyst);
        let slate = orch
            .analyze_slate(
                vec![game("with_stats", true), game("no_stats", false)],
                "2026-02-14".into(),
            )
            .await;

        let seen = orch.analyst.seen.lock().unwrap();
        assert!(seen.iter().all(|(id, _, _)| id == "with_stats"));
        assert!(slate.bets.iter().all(|b| b.game_id == "with_stats"));
        // The no-data game still counted as ranked/analyzed input.
        assert_eq!(slate.games_analyzed, 2);
    }

    #[tokio::test]
    async fn one_failing_game_does_not_abort_the_run() {
        let mut analyst = StubAnalyst::new(0.65, 0.70);
        analyst.fail_game = Some("bad".into());
        let orch = orchestrator(analyst);
        let slate = orch
            .analyze_slate(vec![game("good", true), game("bad", true)], "2026-02-14".into())
            .await;

        assert_eq!(slate.games_analyzed, 2);
        assert_eq!(slate.bets.len(), 2);
        assert!(slate.bets.iter().all(|b| b.game_id == "good"));
    }
}
