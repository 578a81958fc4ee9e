//! High score leaderboard
//!
//! Persisted as JSON, tracks the top 10 final scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the session
    pub score: u64,
    /// Seed the session was played with
    #[serde(default)]
    pub seed: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard, sorted best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a final score (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u64, seed: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            seed,
            timestamp,
        };

        // Ties keep the older entry ahead
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load a leaderboard file, starting fresh if it is missing or unreadable
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<HighScores>(&json) {
                Ok(mut scores) => {
                    scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                    scores.entries.truncate(MAX_HIGH_SCORES);
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt high score file {}: {}", path.display(), e);
                    Self::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Write the leaderboard, replacing the file atomically
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_entries_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(10, 1, 0.0), Some(1));
        assert_eq!(scores.add_score(30, 2, 0.0), Some(1));
        assert_eq!(scores.add_score(20, 3, 0.0), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![30, 20, 10]);
        assert_eq!(scores.top_score(), Some(30));
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(s * 10, s, 0.0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(5, 0, 0.0), None);
        assert_eq!(scores.potential_rank(55), Some(6));
        assert_eq!(scores.add_score(55, 0, 0.0), Some(6));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("fruit-drop-hs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("highscores.json");

        let mut scores = HighScores::new();
        scores.add_score(120, 9, 1_700_000_000_000.0);
        scores.add_score(45, 4, 1_700_000_100_000.0);
        scores.save(&path).unwrap();

        let loaded = HighScores::load(&path);
        assert_eq!(loaded.entries, scores.entries);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_or_corrupt_file_starts_fresh() {
        let dir = std::env::temp_dir().join(format!("fruit-drop-hs-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("highscores.json");

        assert!(HighScores::load(&path).is_empty());
        std::fs::write(&path, "not json").unwrap();
        assert!(HighScores::load(&path).is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
