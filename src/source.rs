//! Game data source seam. Live odds/stats ingestion lives behind this trait;
//! the built-in sample slate keeps the binary runnable without sportsbook
//! credentials.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use market_model::{BetSide, BetType, Game, Odds, TeamStats};

#[async_trait]
pub trait GameSource: Send + Sync {
    /// Zero games is a legal answer and must produce an empty slate, not an
    /// error.
    async fn fetch_games(&self) -> anyhow::Result<Vec<Game>>;
}

/// A realistic four-game CBB slate for development and demos.
pub struct SampleSlate;

#[async_trait]
impl GameSource for SampleSlate {
    async fn fetch_games(&self) -> anyhow::Result<Vec<Game>> {
        Ok(sample_games())
    }
}

fn odds(bet_type: BetType, side: BetSide, line: Option<f64>, price: i32) -> Odds {
    // Sample prices are hand-checked literals.
    Odds::new(bet_type, side, line, price).expect("sample odds are valid")
}

#[allow(clippy::too_many_arguments)]
fn stats(
    name: &str,
    id: &str,
    record: &str,
    off: f64,
    def: f64,
    pace: f64,
    three: f64,
    ats: &str,
    conference: &str,
) -> TeamStats {
    TeamStats {
        team_name: name.into(),
        team_id: id.into(),
        record: record.into(),
        offensive_efficiency: Some(off),
        defensive_efficiency: Some(def),
        pace: Some(pace),
        three_point_rate: Some(three),
        ats_record: Some(ats.into()),
        conference: Some(conference.into()),
        ranking: None,
        last_updated: None,
    }
}

pub fn sample_games() -> Vec<Game> {
    let tip = |hours: i64| Utc::now() + Duration::hours(hours);

    vec![
        Game {
            game_id: "ncaab_uconn_villanova".into(),
            home_team: "UConn Huskies".into(),
            away_team: "Villanova Wildcats".into(),
            game_time: tip(6),
            home_spread: Some(odds(BetType::Spread, BetSide::Home, Some(-7.5), -110)),
            away_spread: Some(odds(BetType::Spread, BetSide::Away, Some(7.5), -110)),
            total_over: Some(odds(BetType::Total, BetSide::Over, Some(138.5), -112)),
            total_under: Some(odds(BetType::Total, BetSide::Under, Some(138.5), -108)),
            home_moneyline: Some(odds(BetType::Moneyline, BetSide::Home, None, -320)),
            away_moneyline: Some(odds(BetType::Moneyline, BetSide::Away, None, 260)),
            home_stats: Some(stats(
                "UConn Huskies",
                "uconn",
                "22-3",
                118.4,
                94.2,
                67.1,
                0.33,
                "14-11",
                "Big East",
            )),
            away_stats: Some(stats(
                "Villanova Wildcats",
                "villanova",
                "14-11",
                105.2,
                102.8,
                63.4,
                0.41,
                "12-13",
                "Big East",
            )),
            injury_notes: Some(
                "Villanova: G Mark Armstrong questionable (ankle). UConn: full strength.".into(),
            ),
        },
        Game {
            game_id: "ncaab_duke_unc".into(),
            home_team: "North Carolina Tar Heels".into(),
            away_team: "Duke Blue Devils".into(),
            game_time: tip(8),
            home_spread: Some(odds(BetType::Spread, BetSide::Home, Some(3.5), -108)),
            away_spread: Some(odds(BetType::Spread, BetSide::Away, Some(-3.5), -112)),
            total_over: Some(odds(BetType::Total, BetSide::Over, Some(155.5), -110)),
            total_under: Some(odds(BetType::Total, BetSide::Under, Some(155.5), -110)),
            home_moneyline: Some(odds(BetType::Moneyline, BetSide::Home, None, 145)),
            away_moneyline: Some(odds(BetType::Moneyline, BetSide::Away, None, -170)),
            home_stats: Some(stats(
                "North Carolina Tar Heels",
                "unc",
                "17-8",
                112.1,
                99.6,
                71.8,
                0.38,
                "15-10",
                "ACC",
            )),
            away_stats: Some(stats(
                "Duke Blue Devils",
                "duke",
                "21-4",
                120.3,
                95.1,
                70.2,
                0.36,
                "13-12",
                "ACC",
            )),
            injury_notes: Some("No significant injuries for either team.".into()),
        },
        Game {
            game_id: "ncaab_kansas_baylor".into(),
            home_team: "Kansas Jayhawks".into(),
            away_team: "Baylor Bears".into(),
            game_time: tip(7),
            home_spread: Some(odds(BetType::Spread, BetSide::Home, Some(-2.5), -115)),
            away_spread: Some(odds(BetType::Spread, BetSide::Away, Some(2.5), -105)),
            total_over: Some(odds(BetType::Total, BetSide::Over, Some(146.5), -110)),
            total_under: Some(odds(BetType::Total, BetSide::Under, Some(146.5), -110)),
            home_moneyline: None,
            away_moneyline: None,
            home_stats: Some(stats(
                "Kansas Jayhawks",
                "kansas",
                "20-5",
                117.2,
                97.4,
                69.3,
                0.35,
                "13-12",
                "Big 12",
            )),
            away_stats: Some(stats(
                "Baylor Bears",
                "baylor",
                "18-7",
                113.2,
                98.9,
                70.4,
                0.37,
                "13-12",
                "Big 12",
            )),
            injury_notes: Some("Both teams fully healthy.".into()),
        },
        Game {
            game_id: "ncaab_gonzaga_arizona".into(),
            home_team: "Arizona Wildcats".into(),
            away_team: "Gonzaga Bulldogs".into(),
            game_time: tip(10),
            home_spread: Some(odds(BetType::Spread, BetSide::Home, Some(1.5), -110)),
            away_spread: Some(odds(BetType::Spread, BetSide::Away, Some(-1.5), -110)),
            total_over: Some(odds(BetType::Total, BetSide::Over, Some(158.5), -110)),
            total_under: Some(odds(BetType::Total, BetSide::Under, Some(158.5), -110)),
            home_moneyline: None,
            away_moneyline: None,
            home_stats: Some(stats(
                "Arizona Wildcats",
                "arizona",
                "20-5",
                119.2,
                96.0,
                71.3,
                0.35,
                "14-11",
                "Big 12",
            )),
            away_stats: Some(stats(
                "Gonzaga Bulldogs",
                "gonzaga",
                "23-2",
                122.7,
                96.3,
                72.1,
                0.34,
                "16-9",
                "WCC",
            )),
            injury_notes: Some("Gonzaga: F Drew Timme limited (knee). Arizona: no injuries.".into()),
        },
    ]
}
