//! SQLite bet ledger: every recommendation the pipeline produces, the
//! running bankroll, and cached team stats. Written once per slate run from
//! the single orchestrating flow; approve/settle are row-level
//! read-modify-write operations driven by the human reviewer.

use std::path::Path;

use chrono::Utc;
use market_model::{BetRecommendation, TeamStats};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bet not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetResult {
    Win,
    Loss,
    Push,
}

impl BetResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetResult::Win => "win",
            BetResult::Loss => "loss",
            BetResult::Push => "push",
        }
    }
}

/// A persisted bet row, as listed back to the reviewer.
#[derive(Debug, Clone)]
pub struct BetRow {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub bet_type: String,
    pub side: String,
    pub line: Option<f64>,
    pub american_price: i32,
    pub expected_value: f64,
    pub recommended_units: f64,
    pub is_recommended: bool,
    pub summary: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Bankroll {
    pub balance_units: f64,
    pub unit_dollar_value: f64,
}

pub struct BetLedger {
    conn: Connection,
}

impl BetLedger {
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let ledger = Self { conn };
        ledger.init_schema()?;
        Ok(ledger)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        let ledger = Self { conn };
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn init_schema(&self) -> Result<(), LedgerError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS bets (
                id TEXT PRIMARY KEY,
                game_id TEXT NOT NULL,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                game_time TEXT NOT NULL,
                bet_type TEXT NOT NULL,
                side TEXT NOT NULL,
                line REAL,
                american_price INTEGER NOT NULL,
                projected_prob REAL NOT NULL,
                implied_prob REAL NOT NULL,
                expected_value REAL NOT NULL,
                recommended_units REAL NOT NULL,
                is_recommended INTEGER NOT NULL,
                summary TEXT NOT NULL,
                reasoning TEXT NOT NULL,
                status TEXT NOT NULL,
                result TEXT,
                profit_loss REAL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS bankroll (
                id INTEGER PRIMARY KEY,
                balance_units REAL NOT NULL,
                unit_dollar_value REAL NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS team_stats (
                team_id TEXT PRIMARY KEY,
                team_name TEXT NOT NULL,
                record TEXT NOT NULL,
                offensive_efficiency REAL,
                defensive_efficiency REAL,
                pace REAL,
                three_point_rate REAL,
                ats_record TEXT,
                conference TEXT,
                ranking INTEGER,
                last_updated TEXT
            );
            "#,
        )?;

        // Seed the bankroll on first open: 100 units at $10/unit.
        let seeded: Option<i64> = self
            .conn
            .query_row("SELECT id FROM bankroll LIMIT 1", [], |row| row.get(0))
            .optional()?;
        if seeded.is_none() {
            self.conn.execute(
                "INSERT INTO bankroll (id, balance_units, unit_dollar_value, updated_at)
                 VALUES (1, 100.0, 10.0, ?1)",
                params![Utc::now().to_rfc3339()],
            )?;
        }
        Ok(())
    }

    pub fn save_recommendation(&self, rec: &BetRecommendation) -> Result<String, LedgerError> {
        let bet_id = Uuid::new_v4().to_string();
        let reasoning = serde_json::to_string(&rec.ev_analysis.reasoning_steps)?;
        self.conn.execute(
            "INSERT INTO bets (
                id, game_id, home_team, away_team, game_time, bet_type, side, line,
                american_price, projected_prob, implied_prob, expected_value,
                recommended_units, is_recommended, summary, reasoning, status,
                result, profit_loss, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, 'pending', NULL, NULL, ?17)",
            params![
                bet_id,
                rec.game_id,
                rec.home_team,
                rec.away_team,
                rec.game_time.to_rfc3339(),
                rec.bet_type.as_str(),
                rec.side.as_str(),
                rec.line,
                rec.american_price,
                rec.ev_analysis.projected_win_probability,
                rec.ev_analysis.implied_probability,
                rec.ev_analysis.expected_value,
                rec.recommended_units,
                rec.is_recommended as i64,
                rec.summary,
                reasoning,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(bet_id)
    }

    fn set_status(&self, bet_id: &str, status: &str) -> Result<(), LedgerError> {
        let updated = self.conn.execute(
            "UPDATE bets SET status = ?1 WHERE id = ?2",
            params![status, bet_id],
        )?;
        if updated == 0 {
            return Err(LedgerError::NotFound(bet_id.to_string()));
        }
        Ok(())
    }

    pub fn approve_bet(&self, bet_id: &str) -> Result<(), LedgerError> {
        self.set_status(bet_id, "approved")
    }

    pub fn reject_bet(&self, bet_id: &str) -> Result<(), LedgerError> {
        self.set_status(bet_id, "rejected")
    }

    /// Marks a bet settled and applies the profit/loss (in units) to the
    /// bankroll in one transaction.
    pub fn settle_bet(
        &mut self,
        bet_id: &str,
        result: BetResult,
        profit_loss: f64,
    ) -> Result<(), LedgerError> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE bets SET status = 'settled', result = ?1, profit_loss = ?2 WHERE id = ?3",
            params![result.as_str(), profit_loss, bet_id],
        )?;
        if updated == 0 {
            return Err(LedgerError::NotFound(bet_id.to_string()));
        }
        tx.execute(
            "UPDATE bankroll SET balance_units = balance_units + ?1, updated_at = ?2 WHERE id = 1",
            params![profit_loss, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn pending_bets(&self) -> Result<Vec<BetRow>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, home_team, away_team, bet_type, side, line,
                    american_price, expected_value, recommended_units,
                    is_recommended, summary
             FROM bets WHERE status = 'pending' ORDER BY created_at",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(BetRow {
                    id: row.get(0)?,
                    home_team: row.get(1)?,
                    away_team: row.get(2)?,
                    bet_type: row.get(3)?,
                    side: row.get(4)?,
                    line: row.get(5)?,
                    american_price: row.get(6)?,
                    expected_value: row.get(7)?,
                    recommended_units: row.get(8)?,
                    is_recommended: row.get::<_, i64>(9)? != 0,
                    summary: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn bankroll(&self) -> Result<Bankroll, LedgerError> {
        let bankroll = self.conn.query_row(
            "SELECT balance_units, unit_dollar_value FROM bankroll WHERE id = 1",
            [],
            |row| {
                Ok(Bankroll {
                    balance_units: row.get(0)?,
                    unit_dollar_value: row.get(1)?,
                })
            },
        )?;
        Ok(bankroll)
    }

    pub fn upsert_team_stats(&self, stats: &TeamStats) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO team_stats (
                team_id, team_name, record, offensive_efficiency, defensive_efficiency,
                pace, three_point_rate, ats_record, conference, ranking, last_updated
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(team_id) DO UPDATE SET
                team_name = excluded.team_name,
                record = excluded.record,
                offensive_efficiency = excluded.offensive_efficiency,
                defensive_efficiency = excluded.defensive_efficiency,
                pace = excluded.pace,
                three_point_rate = excluded.three_point_rate,
                ats_record = excluded.ats_record,
                conference = excluded.conference,
                ranking = excluded.ranking,
                last_updated = excluded.last_updated",
            params![
                stats.team_id,
                stats.team_name,
                stats.record,
                stats.offensive_efficiency,
                stats.defensive_efficiency,
                stats.pace,
                stats.three_point_rate,
                stats.ats_record,
                stats.conference,
                stats.ranking,
                stats
                    .last_updated
                    .map_or_else(|| Utc::now().to_rfc3339(), |t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Cache lookup by primary key.
    pub fn team_stats(&self, team_id: &str) -> Result<Option<TeamStats>, LedgerError> {
        self.team_stats_where("team_id", team_id)
    }

    /// Cache lookup by display name, for backfilling games whose source
    /// carries team names but no ids.
    pub fn team_stats_by_name(&self, team_name: &str) -> Result<Option<TeamStats>, LedgerError> {
        self.team_stats_where("team_name", team_name)
    }

    fn team_stats_where(&self, column: &str, key: &str) -> Result<Option<TeamStats>, LedgerError> {
        let sql = format!(
            "SELECT team_id, team_name, record, offensive_efficiency,
                    defensive_efficiency, pace, three_point_rate, ats_record,
                    conference, ranking
             FROM team_stats WHERE {column} = ?1"
        );
        let stats = self
            .conn
            .query_row(&sql, params![key], |row| {
                Ok(TeamStats {
                    team_id: row.get(0)?,
                    team_name: row.get(1)?,
                    record: row.get(2)?,
                    offensive_efficiency: row.get(3)?,
                    defensive_efficiency: row.get(4)?,
                    pace: row.get(5)?,
                    three_point_rate: row.get(6)?,
                    ats_record: row.get(7)?,
                    conference: row.get(8)?,
                    ranking: row.get(9)?,
                    last_updated: None,
                })
            })
            .optional()?;
        Ok(stats)
    }
}
