//! JSONL audit trail of slate runs, one file per UTC day. Events are typed
//! at the call site and stamped here; write failures are logged and
//! swallowed, an audit log must never take down an analysis run.

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;

/// Everything the journal knows how to record about a run.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlateEvent {
    SlateStart {
        date: String,
        games: usize,
        dry_run: bool,
    },
    SlateComplete {
        date: String,
        games_analyzed: usize,
        bets: usize,
        recommended: usize,
        total_units_at_risk: f64,
    },
    BetSaved {
        bet_id: String,
        game_id: String,
        bet_type: String,
        side: String,
        is_recommended: bool,
    },
}

#[derive(Serialize)]
struct JournalEntry<'a> {
    ts: String,
    #[serde(flatten)]
    event: &'a SlateEvent,
}

pub fn resolve_journal_dir() -> PathBuf {
    if let Ok(raw) = std::env::var("HOOPS_JOURNAL_DIR") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from("data").join("journal")
}

/// Opens the day file per event rather than holding a handle, so day
/// rollover needs no state and a deleted file mid-run self-heals.
pub struct RunJournal {
    dir: PathBuf,
}

impl RunJournal {
    pub fn open(dir: PathBuf) -> std::io::Result<Self> {
        create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn record(&self, event: &SlateEvent) {
        if let Err(e) = self.append(event) {
            warn!("journal write failed: {}", e);
        }
    }

    fn append(&self, event: &SlateEvent) -> std::io::Result<()> {
        let entry = JournalEntry {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        };
        let line = serde_json::to_string(&entry)?;

        let day = Utc::now().format("%Y-%m-%d");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(format!("slate-{day}.jsonl")))?;
        writeln!(file, "{line}")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
