//! Action Log
//!
//! Per-episode audit trail of every decision point, the sinks it is written
//! to when the episode ends, and the offline tools that read it back.
//!
//! Rows recorded by `step` carry the state *before* the action is applied.
//! The forced opening purchase made by `reset` is recorded after the
//! purchase, so it is the only row that can start an episode holding a unit.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use csv::{Reader, Writer};
use serde::Serialize;
use tracing::debug;

use super::account::Account;
use crate::error::{Result, TradesimError};
use crate::rl::core::DiscreteAction;

/// Column header of every action log
pub const ACTION_LOG_HEADER: [&str; 5] = ["step", "action", "balance", "shares_held", "price"];

/// One decision point in the action log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionLogEntry {
    /// Index into the price series
    pub step: usize,
    pub action: DiscreteAction,
    pub balance: f64,
    pub shares_held: u8,
    /// Price the decision was made at
    pub price: f64,
}

impl ActionLogEntry {
    fn to_record(self) -> [String; 5] {
        [
            self.step.to_string(),
            self.action.to_index().to_string(),
            self.balance.to_string(),
            self.shares_held.to_string(),
            self.price.to_string(),
        ]
    }

    fn from_record(row: usize, record: &csv::StringRecord) -> Result<Self> {
        let malformed = |index: usize| {
            TradesimError::InvalidActionLog(format!(
                "row {} has a malformed {}",
                row, ACTION_LOG_HEADER[index]
            ))
        };

        let action_index: usize = field(record, row, 1)?.parse().map_err(|_| malformed(1))?;
        let action = DiscreteAction::from_index(action_index).ok_or_else(|| malformed(1))?;

        Ok(Self {
            step: field(record, row, 0)?.parse().map_err(|_| malformed(0))?,
            action,
            balance: field(record, row, 2)?.parse().map_err(|_| malformed(2))?,
            shares_held: field(record, row, 3)?.parse().map_err(|_| malformed(3))?,
            price: field(record, row, 4)?.parse().map_err(|_| malformed(4))?,
        })
    }
}

fn field(record: &csv::StringRecord, row: usize, index: usize) -> Result<&str> {
    record.get(index).map(str::trim).ok_or_else(|| {
        TradesimError::InvalidActionLog(format!(
            "row {} is missing column {}",
            row, ACTION_LOG_HEADER[index]
        ))
    })
}

/// Destination for a finished episode's action log
#[cfg_attr(test, mockall::automock)]
pub trait ActionLogSink: Send {
    /// Persist the whole log of one episode. Called exactly once per episode,
    /// when it ends.
    fn write_episode(&mut self, entries: &[ActionLogEntry]) -> Result<()>;
}

/// Write an action log as CSV with the standard header
pub fn write_action_log<W: io::Write>(writer: W, entries: &[ActionLogEntry]) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    writer.write_record(ACTION_LOG_HEADER)?;
    for entry in entries {
        writer.write_record(entry.to_record())?;
    }

    writer.flush()?;
    Ok(())
}

/// CSV file sink. Each episode overwrites the previous one.
#[derive(Debug, Clone)]
pub struct CsvActionLog {
    path: PathBuf,
}

impl CsvActionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActionLogSink for CsvActionLog {
    fn write_episode(&mut self, entries: &[ActionLogEntry]) -> Result<()> {
        let file = File::create(&self.path)?;
        write_action_log(file, entries)?;
        debug!(path = %self.path.display(), rows = entries.len(), "Wrote action log");
        Ok(())
    }
}

/// In-memory sink keeping every episode's log. Clones share storage, so a
/// clone kept by the caller sees what the environment writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryActionLog {
    episodes: Arc<Mutex<Vec<Vec<ActionLogEntry>>>>,
}

impl MemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs written so far, oldest first
    pub fn episodes(&self) -> Vec<Vec<ActionLogEntry>> {
        self.episodes
            .lock()
            .map(|episodes| episodes.clone())
            .unwrap_or_default()
    }

    pub fn last_episode(&self) -> Option<Vec<ActionLogEntry>> {
        self.episodes().pop()
    }
}

impl ActionLogSink for MemoryActionLog {
    fn write_episode(&mut self, entries: &[ActionLogEntry]) -> Result<()> {
        let mut episodes = self
            .episodes
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "action log buffer poisoned"))?;
        episodes.push(entries.to_vec());
        Ok(())
    }
}

/// Read an action log CSV file
pub fn read_action_log<P: AsRef<Path>>(path: P) -> Result<Vec<ActionLogEntry>> {
    let file = File::open(path)?;
    read_action_log_from(file)
}

/// Read an action log from any CSV source
pub fn read_action_log_from<R: io::Read>(reader: R) -> Result<Vec<ActionLogEntry>> {
    let mut reader = Reader::from_reader(reader);

    let header = reader.headers()?.clone();
    if header.iter().map(str::trim).ne(ACTION_LOG_HEADER.iter().copied()) {
        return Err(TradesimError::InvalidActionLog(format!(
            "unexpected header {:?}",
            header
        )));
    }

    reader
        .records()
        .enumerate()
        .map(|(row, record)| ActionLogEntry::from_record(row + 1, &record?))
        .collect()
}

/// How often each action appears in a log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub hold: usize,
    pub buy: usize,
    pub sell: usize,
}

impl ActionCounts {
    pub fn tally(entries: &[ActionLogEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut counts, entry| {
            match entry.action {
                DiscreteAction::Hold => counts.hold += 1,
                DiscreteAction::Buy => counts.buy += 1,
                DiscreteAction::Sell => counts.sell += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.hold + self.buy + self.sell
    }
}

/// Account state after a replayed row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayState {
    pub step: usize,
    pub balance: f64,
    pub shares_held: u8,
}

/// Result of replaying an action log
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// State after each row, one per entry
    pub trajectory: Vec<ReplayState>,
    /// Balance after liquidating any position left open by the last row
    pub final_balance: f64,
    pub total_profit: f64,
}

/// Re-run a logged episode from `initial_balance` using the environment's
/// trading rules, including liquidation at the last logged price.
pub fn replay(entries: &[ActionLogEntry], initial_balance: f64) -> ReplayOutcome {
    let mut account = Account::new(initial_balance);
    let mut trajectory = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry.action {
            DiscreteAction::Buy => {
                account.buy(entry.price);
            }
            DiscreteAction::Sell => {
                account.sell(entry.price);
            }
            DiscreteAction::Hold => {}
        }

        trajectory.push(ReplayState {
            step: entry.step,
            balance: account.balance(),
            shares_held: account.shares_held(),
        });
    }

    if let Some(last) = entries.last() {
        account.sell(last.price);
    }

    ReplayOutcome {
        trajectory,
        final_balance: account.balance(),
        total_profit: account.balance() - initial_balance,
    }
}
