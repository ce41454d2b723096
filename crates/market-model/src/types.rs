//! Core entities: games, team stats, analyses, recommendations, slates.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;
use crate::odds::Odds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Spread,
    Moneyline,
    Total,
    PlayerProp,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Spread => "spread",
            BetType::Moneyline => "moneyline",
            BetType::Total => "total",
            BetType::PlayerProp => "player_prop",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BetSide {
    Home,
    Away,
    Over,
    Under,
}

impl BetSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetSide::Home => "home",
            BetSide::Away => "away",
            BetSide::Over => "over",
            BetSide::Under => "under",
        }
    }
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team's season snapshot. Every performance metric is optional; absence
/// means unknown, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TeamStats {
    pub team_name: String,
    pub team_id: String,
    /// e.g. "15-5"
    pub record: String,
    /// Points per 100 possessions.
    pub offensive_efficiency: Option<f64>,
    /// Points allowed per 100 possessions.
    pub defensive_efficiency: Option<f64>,
    /// Possessions per 40 minutes.
    pub pace: Option<f64>,
    /// 3PA / FGA ratio.
    pub three_point_rate: Option<f64>,
    /// Against-the-spread record, e.g. "12-8".
    pub ats_record: Option<String>,
    pub conference: Option<String>,
    pub ranking: Option<u32>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A scheduled matchup with up to six independently optional odds slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Game {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub game_time: DateTime<Utc>,
    pub home_spread: Option<Odds>,
    pub away_spread: Option<Odds>,
    pub total_over: Option<Odds>,
    pub total_under: Option<Odds>,
    pub home_moneyline: Option<Odds>,
    pub away_moneyline: Option<Odds>,
    pub home_stats: Option<TeamStats>,
    pub away_stats: Option<TeamStats>,
    pub injury_notes: Option<String>,
}

impl Game {
    /// The odds slot backing a (market, side) pair, if the book offers it.
    pub fn odds_for(&self, bet_type: BetType, side: BetSide) -> Option<&Odds> {
        match (bet_type, side) {
            (BetType::Spread, BetSide::Home) => self.home_spread.as_ref(),
            (BetType::Spread, BetSide::Away) => self.away_spread.as_ref(),
            (BetType::Total, BetSide::Over) => self.total_over.as_ref(),
            (BetType::Total, BetSide::Under) => self.total_under.as_ref(),
            (BetType::Moneyline, BetSide::Home) => self.home_moneyline.as_ref(),
            (BetType::Moneyline, BetSide::Away) => self.away_moneyline.as_ref(),
            _ => None,
        }
    }

    fn odds_slots(&self) -> [Option<&Odds>; 6] {
        [
            self.home_spread.as_ref(),
            self.away_spread.as_ref(),
            self.total_over.as_ref(),
            self.total_under.as_ref(),
            self.home_moneyline.as_ref(),
            self.away_moneyline.as_ref(),
        ]
    }

    /// A game with zero populated odds slots is not an analysis candidate.
    pub fn has_any_odds(&self) -> bool {
        self.odds_slots().iter().any(|o| o.is_some())
    }

    /// Strict ingestion check: every populated slot carries a legal price
    /// and at least one slot is populated.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.has_any_odds() {
            return Err(ModelError::NoMarkets(self.game_id.clone()));
        }
        for odds in self.odds_slots().into_iter().flatten() {
            odds.validate()?;
        }
        Ok(())
    }

    /// How many sides we hold stats for (0-2).
    pub fn stats_coverage(&self) -> u8 {
        u8::from(self.home_stats.is_some()) + u8::from(self.away_stats.is_some())
    }
}

/// The reasoning model's structured output for one (game, market, side).
/// EV and probabilities are trusted as given; only downstream gating and
/// stake sizing reinterpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvAnalysis {
    pub bet_type: BetType,
    pub side: BetSide,
    /// 3-5 ordered chain-of-thought steps.
    pub reasoning_steps: Vec<String>,
    /// Model's estimated win probability, 0.0-1.0.
    pub projected_win_probability: f64,
    /// Sportsbook implied probability for the evaluated price, 0.0-1.0.
    pub implied_probability: f64,
    /// EV = projected_win_probability * decimal_odds - 1.
    pub expected_value: f64,
    /// Model's confidence in its own estimate, 0.0-1.0.
    pub confidence: f64,
}

/// The decision artifact for one (game, market, side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BetRecommendation {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub game_time: DateTime<Utc>,
    pub bet_type: BetType,
    pub side: BetSide,
    pub line: Option<f64>,
    pub american_price: i32,
    pub ev_analysis: EvAnalysis,
    /// Kelly-sized stake in units, 0.0-5.0 schema bound, policy-capped lower.
    pub recommended_units: f64,
    pub is_recommended: bool,
    /// One-sentence rationale, max 25 words.
    pub summary: String,
}

impl BetRecommendation {
    pub fn expected_value(&self) -> f64 {
        self.ev_analysis.expected_value
    }
}

/// All recommendations produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySlate {
    /// YYYY-MM-DD.
    pub date: String,
    pub games_analyzed: usize,
    pub bets: Vec<BetRecommendation>,
    pub total_units_at_risk: f64,
}

impl DailySlate {
    /// Builds a slate with units-at-risk derived from the recommended set.
    pub fn assemble(date: String, games_analyzed: usize, bets: Vec<BetRecommendation>) -> Self {
        let mut slate = Self {
            date,
            games_analyzed,
            bets,
            total_units_at_risk: 0.0,
        };
        slate.recompute_units_at_risk();
        slate
    }

    pub fn recommended(&self) -> impl Iterator<Item = &BetRecommendation> {
        self.bets.iter().filter(|b| b.is_recommended)
    }

    pub fn recompute_units_at_risk(&mut self) {
        self.total_units_at_risk = self.recommended().map(|b| b.recommended_units).sum();
    }
}
