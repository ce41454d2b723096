use market_model::odds::implied_probability_for_price;
use market_model::{BetRecommendation, BetSide, BetType, Game, Odds};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no stats for either team in game {0}; refusing to prompt blind")]
    NoTeamData(String),
    #[error("game {game_id} offers no odds for {bet_type}/{side}")]
    MissingOdds {
        game_id: String,
        bet_type: BetType,
        side: BetSide,
    },
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Timeout")]
    Timeout,
    #[error("Schema validation failed: {0}")]
    SchemaValidationFailed(String),
}

/// One (game, market, side) decision context, validated at construction:
/// the market must actually be offered, and at least one team must have
/// stats. The second guard runs before any model call so the model is never
/// pushed into fabricating team context.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub game: Game,
    pub bet_type: BetType,
    pub side: BetSide,
    odds: Odds,
}

impl AnalysisRequest {
    pub fn new(game: Game, bet_type: BetType, side: BetSide) -> Result<Self, AnalysisError> {
        if game.home_stats.is_none() && game.away_stats.is_none() {
            return Err(AnalysisError::NoTeamData(game.game_id.clone()));
        }
        let odds = game
            .odds_for(bet_type, side)
            .cloned()
            .ok_or_else(|| AnalysisError::MissingOdds {
                game_id: game.game_id.clone(),
                bet_type,
                side,
            })?;
        Ok(Self {
            game,
            bet_type,
            side,
            odds,
        })
    }

    /// The line being evaluated. Presence was checked at construction.
    pub fn odds(&self) -> &Odds {
        &self.odds
    }
}

/// Structural checks on a parsed model response. EV itself is trusted as
/// given; only shapes and ranges are enforced here.
pub fn validate_recommendation(rec: &BetRecommendation) -> Result<(), AnalysisError> {
    let analysis = &rec.ev_analysis;
    if !(0.0..=1.0).contains(&analysis.projected_win_probability) {
        return Err(AnalysisError::SchemaValidationFailed(
            "projected_win_probability must be in [0,1]".into(),
        ));
    }
    if !(0.0..=1.0).contains(&analysis.implied_probability) {
        return Err(AnalysisError::SchemaValidationFailed(
            "implied_probability must be in [0,1]".into(),
        ));
    }
    if !(0.0..=1.0).contains(&analysis.confidence) {
        return Err(AnalysisError::SchemaValidationFailed(
            "confidence must be in [0,1]".into(),
        ));
    }
    if !(3..=5).contains(&analysis.reasoning_steps.len()) {
        return Err(AnalysisError::SchemaValidationFailed(format!(
            "expected 3-5 reasoning steps, got {}",
            analysis.reasoning_steps.len()
        )));
    }
    if !(0.0..=5.0).contains(&rec.recommended_units) {
        return Err(AnalysisError::SchemaValidationFailed(format!(
            "recommended_units out of range: {}",
            rec.recommended_units
        )));
    }
    Ok(())
}

/// Overwrites every identifying field on the response with the request's
/// values. A model echoing back a mismatched identity would otherwise
/// corrupt slate deduplication, so the mismatch is corrected rather than
/// surfaced; the numeric content is still taken for the requested triple.
/// The implied probability is likewise re-derived from the requested price.
pub fn enforce_request_identity(
    request: &AnalysisRequest,
    mut rec: BetRecommendation,
) -> BetRecommendation {
    rec.game_id = request.game.game_id.clone();
    rec.home_team = request.game.home_team.clone();
    rec.away_team = request.game.away_team.clone();
    rec.game_time = request.game.game_time;
    rec.bet_type = request.bet_type;
    rec.side = request.side;
    rec.line = request.odds.line;
    rec.american_price = request.odds.american_price;
    rec.ev_analysis.bet_type = request.bet_type;
    rec.ev_analysis.side = request.side;
    rec.ev_analysis.implied_probability =
        implied_probability_for_price(request.odds.american_price);
    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_model::{EvAnalysis, TeamStats};

    pub(crate) fn sample_game() -> Game {
        Game {
            game_id: "ncaab_auburn_tennessee".into(),
            home_team: "Auburn Tigers".into(),
            away_team: "Tennessee Volunteers".into(),
            game_time: Utc::now(),
            home_spread: Some(
                Odds::new(BetType::Spread, BetSide::Home, Some(-4.5), -110).unwrap(),
            ),
            away_spread: Some(Odds::new(BetType::Spread, BetSide::Away, Some(4.5), -110).unwrap()),
            total_over: Some(Odds::new(BetType::Total, BetSide::Over, Some(134.5), -108).unwrap()),
            total_under: Some(
                Odds::new(BetType::Total, BetSide::Under, Some(134.5), -112).unwrap(),
            ),
            home_moneyline: None,
            away_moneyline: None,
            home_stats: Some(TeamStats {
                team_name: "Auburn Tigers".into(),
                team_id: "auburn".into(),
                record: "22-3".into(),
                offensive_efficiency: Some(119.8),
                defensive_efficiency: Some(93.5),
                pace: Some(73.4),
                three_point_rate: Some(0.37),
                ats_record: Some("17-8".into()),
                conference: Some("SEC".into()),
                ranking: Some(1),
                last_updated: None,
            }),
            away_stats: None,
            injury_notes: Some("Tennessee: PG probable (soreness).".into()),
        }
    }

    fn model_rec() -> BetRecommendation {
        BetRecommendation {
            game_id: "some_other_game".into(),
            home_team: "Wrong Team".into(),
            away_team: "Also Wrong".into(),
            game_time: Utc::now(),
            bet_type: BetType::Moneyline,
            side: BetSide::Under,
            line: None,
            american_price: 145,
            ev_analysis: EvAnalysis {
                bet_type: BetType::Moneyline,
                side: BetSide::Under,
                reasoning_steps: vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
                projected_win_probability: 0.56,
                implied_probability: 0.41,
                expected_value: 0.069,
                confidence: 0.62,
            },
            recommended_units: 1.2,
            is_recommended: true,
            summary: "Auburn's pace advantage should cover at home.".into(),
        }
    }

    #[test]
    fn rejects_games_with_no_stats_on_either_side() {
        let mut game = sample_game();
        game.home_stats = None;
        let err = AnalysisRequest::new(game, BetType::Spread, BetSide::Home).unwrap_err();
        assert!(matches!(err, AnalysisError::NoTeamData(_)));
    }

    #[test]
    fn rejects_markets_the_book_does_not_offer() {
        let err =
            AnalysisRequest::new(sample_game(), BetType::Moneyline, BetSide::Home).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingOdds { .. }));
    }

    #[test]
    fn identity_fields_are_forced_back_to_the_request() {
        let request = AnalysisRequest::new(sample_game(), BetType::Spread, BetSide::Home).unwrap();
        let fixed = enforce_request_identity(&request, model_rec());
        assert_eq!(fixed.game_id, "ncaab_auburn_tennessee");
        assert_eq!(fixed.home_team, "Auburn Tigers");
        assert_eq!(fixed.bet_type, BetType::Spread);
        assert_eq!(fixed.side, BetSide::Home);
        assert_eq!(fixed.line, Some(-4.5));
        assert_eq!(fixed.american_price, -110);
        assert_eq!(fixed.ev_analysis.bet_type, BetType::Spread);
        assert_eq!(fixed.ev_analysis.side, BetSide::Home);
        assert!((fixed.ev_analysis.implied_probability - 0.5238).abs() < 1e-3);
        // Numeric estimates are preserved.
        assert_eq!(fixed.ev_analysis.expected_value, 0.069);
        assert_eq!(fixed.ev_analysis.confidence, 0.62);
    }

    #[test]
    fn validation_enforces_ranges_and_step_count() {
        assert!(validate_recommendation(&model_rec()).is_ok());

        let mut bad = model_rec();
        bad.ev_analysis.confidence = 1.3;
        assert!(validate_recommendation(&bad).is_err());

        let mut bad = model_rec();
        bad.ev_analysis.reasoning_steps = vec!["only one".into()];
        assert!(validate_recommendation(&bad).is_err());

        let mut bad = model_rec();
        bad.recommended_units = 9.0;
        assert!(validate_recommendation(&bad).is_err());
    }
}
