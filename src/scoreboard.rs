//! Leaderboard collaborator
//!
//! Submissions are best-effort: failures are logged and swallowed so a broken
//! leaderboard never interrupts a run. The local board persists the top 10 to
//! a JSON file next to the settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Maximum number of scores to keep
pub const MAX_SCORES: usize = 10;

/// Names longer than this are cut
pub const MAX_NAME_LEN: usize = 15;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

impl ScoreEntry {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: name.trim().chars().take(MAX_NAME_LEN).collect(),
            score,
        }
    }
}

/// Remote or local leaderboard
pub trait Scoreboard {
    /// Record a finished run; never fails from the caller's point of view
    fn submit(&mut self, name: &str, score: u64);

    /// Up to `n` best entries, highest first
    fn fetch_top(&self, n: usize) -> Vec<ScoreEntry>;
}

/// Leaderboard backed by a JSON file
#[derive(Debug, Clone)]
pub struct LocalScoreboard {
    path: PathBuf,
    entries: Vec<ScoreEntry>,
}

impl LocalScoreboard {
    /// Open the board at `path`, starting empty if it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(entries) => {
                log::info!("Loaded {} scores from {}", entries.len(), path.display());
                entries
            }
            Err(e) => {
                if path.exists() {
                    log::warn!("Ignoring unreadable scoreboard {}: {}", path.display(), e);
                } else {
                    log::info!("No scoreboard at {}, starting fresh", path.display());
                }
                Vec::new()
            }
        };

        let mut board = Self { path, entries };
        board.normalize();
        board
    }

    fn read(path: &Path) -> Result<Vec<ScoreEntry>> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Sorted descending, trimmed to `MAX_SCORES`
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_SCORES);
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

impl Scoreboard for LocalScoreboard {
    fn submit(&mut self, name: &str, score: u64) {
        let entry = ScoreEntry::new(name, score);
        // Ties keep the earlier entry ahead
        let rank = self.potential_rank(score).filter(|_| !entry.name.is_empty());
        let Some(rank) = rank else {
            log::debug!("Score {} for {:?} not recorded", score, name);
            return;
        };
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_SCORES);

        match self.write() {
            Ok(()) => log::info!(
                "Score {} saved at rank {} ({})",
                score,
                rank,
                self.path.display()
            ),
            Err(e) => log::warn!("Failed to save scoreboard {}: {}", self.path.display(), e),
        }
    }

    fn fetch_top(&self, n: usize) -> Vec<ScoreEntry> {
        self.entries.iter().take(n).cloned().collect()
    }
}

/// The leaderboard service is unavailable: nothing is stored
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineScoreboard;

impl Scoreboard for OfflineScoreboard {
    fn submit(&mut self, name: &str, score: u64) {
        log::warn!("Scoreboard offline, dropping score {} for {}", score, name);
    }

    fn fetch_top(&self, _n: usize) -> Vec<ScoreEntry> {
        Vec::new()
    }
}
