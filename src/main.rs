mod app;
mod config;
mod journal;
mod ledger;
mod orchestrator;
mod source;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use app::App;
use config::AppConfig;
use ledger::BetResult;
use source::SampleSlate;

#[derive(Parser)]
#[command(name = "hoops-edge", about = "CBB +EV betting assistant")]
struct Cli {
    /// Path to the TOML config; defaults apply when the file is absent.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze today's slate and persist recommendations.
    Slate {
        /// Analyze without writing to the ledger.
        #[arg(long)]
        dry_run: bool,
    },
    /// List pending bets awaiting review.
    Bets,
    /// Show the current bankroll.
    Bankroll,
    /// Approve a pending bet by id.
    Approve { bet_id: String },
    /// Reject a pending bet by id.
    Reject { bet_id: String },
    /// Settle a bet and apply the profit or loss (in units) to the bankroll.
    Settle {
        bet_id: String,
        result: SettleResult,
        profit_loss: f64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SettleResult {
    Win,
    Loss,
    Push,
}

impl From<SettleResult> for BetResult {
    fn from(value: SettleResult) -> Self {
        match value {
            SettleResult::Win => BetResult::Win,
            SettleResult::Loss => BetResult::Loss,
            SettleResult::Push => BetResult::Push,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = if std::path::Path::new(&cli.config).exists() {
        AppConfig::load(&cli.config)?
    } else {
        info!("No config at {}; using defaults", cli.config);
        AppConfig::default()
    };

    let mut app = App::new(config, Box::new(SampleSlate))?;
    match cli.command {
        Command::Slate { dry_run } => app.run_slate(dry_run).await?,
        Command::Bets => app.show_pending()?,
        Command::Bankroll => app.show_bankroll()?,
        Command::Approve { bet_id } => app.approve(&bet_id)?,
        Command::Reject { bet_id } => app.reject(&bet_id)?,
        Command::Settle {
            bet_id,
            result,
            profit_loss,
        } => app.settle(&bet_id, result.into(), profit_loss)?,
    }

    Ok(())
}
