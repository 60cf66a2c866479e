//! Survival-time leaderboard
//!
//! Persisted as JSON, holds `n_scores` entries sorted by time (longest first).
//! A fresh table is seeded with placeholder entries so there is always a
//! time to beat.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError};

/// Name shown for placeholder entries
pub const PLACEHOLDER_NAME: &str = "-";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    /// Survival time in milliseconds
    pub time_ms: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self::with_placeholders(8)
    }
}

impl HighScores {
    /// Table of `len` placeholders, 2:30 down in 15 second steps
    pub fn with_placeholders(len: usize) -> Self {
        let entries = (0..len)
            .map(|i| HighScoreEntry {
                name: PLACEHOLDER_NAME.to_string(),
                time_ms: 150_000u64.saturating_sub(i as u64 * 15_000),
            })
            .collect();
        Self { entries }
    }

    /// Check if a time beats the last entry
    pub fn qualifies(&self, time_ms: u64) -> bool {
        match self.entries.last() {
            Some(last) => time_ms > last.time_ms,
            None => false,
        }
    }

    /// Get the rank a time would achieve (0-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, time_ms: u64) -> Option<usize> {
        if !self.qualifies(time_ms) {
            return None;
        }
        self.entries.iter().position(|e| time_ms > e.time_ms)
    }

    /// Insert a time, shifting lower entries down and dropping the last.
    /// Returns the rank achieved (0-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, name: &str, time_ms: u64) -> Option<usize> {
        let rank = self.potential_rank(time_ms)?;
        let len = self.entries.len();
        self.entries.insert(
            rank,
            HighScoreEntry {
                name: name.to_string(),
                time_ms,
            },
        );
        self.entries.truncate(len);
        log::info!("New high score #{} by {}: {}", rank + 1, name, format_time(time_ms, true));
        Some(rank)
    }

    /// Get the top time (if any)
    pub fn top_time(&self) -> Option<u64> {
        self.entries.first().map(|e| e.time_ms)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table, resizing it to `len` entries
    pub fn load_from(path: &Path, len: usize) -> Result<Self, PersistError> {
        let mut scores: HighScores = persistence::load_json(path)?;
        scores.resize(len);
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    /// Load a table, falling back to placeholders when missing or corrupt
    pub fn load_or_default(path: &Path, len: usize) -> Self {
        match Self::load_from(path, len) {
            Ok(scores) => scores,
            Err(e) => {
                log::warn!("No usable high scores at {}: {e}", path.display());
                Self::with_placeholders(len)
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PersistError> {
        persistence::save_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    fn resize(&mut self, len: usize) {
        self.entries.sort_by(|a, b| b.time_ms.cmp(&a.time_ms));
        if self.entries.len() > len {
            self.entries.truncate(len);
        } else {
            let fill = Self::with_placeholders(len);
            let missing = len - self.entries.len();
            self.entries.extend(fill.entries.into_iter().rev().take(missing).rev());
            self.entries.sort_by(|a, b| b.time_ms.cmp(&a.time_ms));
        }
    }
}

/// Format milliseconds as ` m:ss.t`, or ` s.t` under a minute unless `full`
pub fn format_time(ms: u64, full: bool) -> String {
    let min = ms / 60_000;
    let sec = ms / 1000 % 60;
    let tenths = ms % 1000 / 100;
    if full || min > 0 {
        format!("{min:2}:{sec:02}.{tenths}")
    } else {
        format!("{sec:2}.{tenths}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_descend() {
        let scores = HighScores::default();
        assert_eq!(scores.len(), 8);
        assert_eq!(scores.top_time(), Some(150_000));
        assert_eq!(scores.entries[7].time_ms, 45_000);
    }

    #[test]
    fn test_add_score_ranks_and_trims() {
        let mut scores = HighScores::default();
        assert_eq!(scores.add_score("slow", 45_000), None);
        assert_eq!(scores.add_score("ace", 200_000), Some(0));
        assert_eq!(scores.add_score("mid", 100_000), Some(5));
        assert_eq!(scores.len(), 8);
        assert_eq!(scores.entries[0].name, "ace");
        assert_eq!(scores.entries[5].name, "mid");
        assert_eq!(scores.entries[7].time_ms, 75_000);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(5_300, false), " 5.3");
        assert_eq!(format_time(5_300, true), " 0:05.3");
        assert_eq!(format_time(125_450, false), " 2:05.4");
        assert_eq!(format_time(600_000, true), "10:00.0");
    }

    #[test]
    fn test_resize_after_load() {
        let mut scores = HighScores {
            entries: vec![HighScoreEntry {
                name: "solo".into(),
                time_ms: 99_000,
            }],
        };
        scores.resize(3);
        // Filled from the bottom of the placeholder table, then re-sorted
        let times: Vec<u64> = scores.entries.iter().map(|e| e.time_ms).collect();
        assert_eq!(times, vec![135_000, 120_000, 99_000]);
    }
}
