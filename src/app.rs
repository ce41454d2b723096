//! Wires the pipeline to its collaborators: game source in, reasoning
//! client out, ledger and journal behind the slate run, and the plain-text
//! rendering the reviewer sees.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use ev_agent::EvClient;
use market_model::DailySlate;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::journal::{resolve_journal_dir, RunJournal, SlateEvent};
use crate::ledger::{BetLedger, BetResult};
use crate::orchestrator::SlateOrchestrator;
use crate::source::GameSource;

pub struct App {
    config: AppConfig,
    source: Box<dyn GameSource>,
    ledger: BetLedger,
    journal: RunJournal,
}

impl App {
    pub fn new(config: AppConfig, source: Box<dyn GameSource>) -> Result<Self> {
        let ledger = BetLedger::open(Path::new(&config.ledger.db_path))?;
        let journal = RunJournal::open(resolve_journal_dir())?;
        info!("Run journal path: {}", journal.dir().display());
        Ok(Self {
            config,
            source,
            ledger,
            journal,
        })
    }

    pub async fn run_slate(&mut self, dry_run: bool) -> Result<()> {
        if !self.config.llm.provider.eq_ignore_ascii_case("anthropic") {
            warn!(
                "Configured provider '{}' but this workflow currently supports Anthropic only",
                self.config.llm.provider
            );
        }

        let api_key =
            std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY must be set")?;
        let analyst = EvClient::new(
            api_key,
            self.config.llm.model.clone(),
            self.config.llm.timeout_ms,
            self.config.llm.max_retries,
        )?;

        let mut games = self.source.fetch_games().await?;
        for game in &mut games {
            for stats in [&game.home_stats, &game.away_stats].into_iter().flatten() {
                self.ledger.upsert_team_stats(stats)?;
            }
            // Backfill from the stats cache when the source came up empty.
            if game.home_stats.is_none() {
                game.home_stats = self.ledger.team_stats_by_name(&game.home_team)?;
            }
            if game.away_stats.is_none() {
                game.away_stats = self.ledger.team_stats_by_name(&game.away_team)?;
            }
        }
        let date = Local::now().format("%Y-%m-%d").to_string();
        info!("Analyzing {} games on the {} slate", games.len(), date);
        self.journal.record(&SlateEvent::SlateStart {
            date: date.clone(),
            games: games.len(),
            dry_run,
        });

        let orchestrator = SlateOrchestrator::new(
            Arc::new(analyst),
            self.config.analysis.policy.clone(),
            self.config.analysis.max_games,
        );
        let slate = orchestrator.analyze_slate(games, date).await;

        self.journal.record(&SlateEvent::SlateComplete {
            date: slate.date.clone(),
            games_analyzed: slate.games_analyzed,
            bets: slate.bets.len(),
            recommended: slate.recommended().count(),
            total_units_at_risk: slate.total_units_at_risk,
        });

        render_slate(&slate);

        if dry_run {
            info!("Dry run: slate not persisted");
        } else {
            for rec in &slate.bets {
                let bet_id = self.ledger.save_recommendation(rec)?;
                self.journal.record(&SlateEvent::BetSaved {
                    bet_id,
                    game_id: rec.game_id.clone(),
                    bet_type: rec.bet_type.as_str().into(),
                    side: rec.side.as_str().into(),
                    is_recommended: rec.is_recommended,
                });
            }
        }

        let bankroll = self.ledger.bankroll()?;
        println!(
            "  Bankroll: {:.1}u (${:.2})",
            bankroll.balance_units,
            bankroll.balance_units * bankroll.unit_dollar_value
        );
        Ok(())
    }

    pub fn show_pending(&self) -> Result<()> {
        let bets = self.ledger.pending_bets()?;
        if bets.is_empty() {
            println!("No pending bets.");
            return Ok(());
        }
        println!("PENDING BETS ({})", bets.len());
        for bet in bets {
            let line = bet
                .line
                .map_or_else(String::new, |l| format!(" {l:+.1}"));
            println!(
                "  [{}] {} @ {} | {} {}{} @ {:+} | EV: {:+.1}% | {:.2}u",
                &bet.id[..8],
                bet.away_team,
                bet.home_team,
                bet.bet_type.to_uppercase(),
                bet.side.to_uppercase(),
                line,
                bet.american_price,
                bet.expected_value * 100.0,
                bet.recommended_units,
            );
            println!("  -> {}", bet.summary);
        }
        Ok(())
    }

    pub fn show_bankroll(&self) -> Result<()> {
        let bankroll = self.ledger.bankroll()?;
        println!(
            "Bankroll: {:.1} units (${:.2} @ ${:.2}/unit)",
            bankroll.balance_units,
            bankroll.balance_units * bankroll.unit_dollar_value,
            bankroll.unit_dollar_value,
        );
        Ok(())
    }

    pub fn approve(&self, bet_id: &str) -> Result<()> {
        self.ledger.approve_bet(bet_id)?;
        println!("Approved {bet_id}");
        Ok(())
    }

    pub fn reject(&self, bet_id: &str) -> Result<()> {
        self.ledger.reject_bet(bet_id)?;
        println!("Rejected {bet_id}");
        Ok(())
    }

    pub fn settle(&mut self, bet_id: &str, result: BetResult, profit_loss: f64) -> Result<()> {
        self.ledger.settle_bet(bet_id, result, profit_loss)?;
        println!("Settled {bet_id} ({}) at {profit_loss:+.2}u", result.as_str());
        self.show_bankroll()
    }
}

fn render_slate(slate: &DailySlate) {
    println!("{}", "-".repeat(60));
    println!("  DATE: {} | GAMES: {}", slate.date, slate.games_analyzed);
    println!("{}", "-".repeat(60));

    let recommended = slate.recommended().count();
    if recommended == 0 {
        println!("  No +EV bets found today. Sit on your hands.");
    } else {
        println!("  {recommended} +EV bet(s) found:");
    }

    for rec in &slate.bets {
        let marker = if rec.is_recommended { "*" } else { " " };
        let line = rec.line.map_or_else(String::new, |l| format!(" {l:+.1}"));
        println!(
            "  {marker} [{}] {} @ {} | {}{} @ {:+} | EV: {:+.1}% | {:.2}u",
            rec.bet_type.as_str().to_uppercase(),
            rec.away_team,
            rec.home_team,
            rec.side.as_str().to_uppercase(),
            line,
            rec.american_price,
            rec.ev_analysis.expected_value * 100.0,
            rec.recommended_units,
        );
        println!("     -> {}", rec.summary);
    }

    println!("{}", "-".repeat(60));
    println!("  Total units at risk: {:.2}u", slate.total_units_at_risk);
}
