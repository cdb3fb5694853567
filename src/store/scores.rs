use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::model::{RankListId, UserId};

/// One stored composite score, keyed by (rank_list_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRow {
    pub rank_list_id: RankListId,
    pub user_id: UserId,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

/// The on-disk score board: every (rank list, user) score the aggregator has
/// produced. Rows are only ever written through `upsert`, which keeps the
/// composite key unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub version: u32,
    #[serde(default)]
    pub rows: Vec<ScoreRow>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreBoard {
    /// Create a new empty score board with version 1.
    pub fn new() -> Self {
        Self {
            version: 1,
            rows: Vec::new(),
        }
    }

    /// Insert or overwrite the score for (rank_list_id, user_id).
    ///
    /// Overwrites replace the score and refresh `updated_at`; they never
    /// produce a second row for the same key.
    pub fn upsert(&mut self, rank_list_id: RankListId, user_id: UserId, score: f64) {
        let now = Utc::now();
        match self.position(rank_list_id, user_id) {
            Some(idx) => {
                self.rows[idx].score = score;
                self.rows[idx].updated_at = now;
            }
            None => self.rows.push(ScoreRow {
                rank_list_id,
                user_id,
                score,
                updated_at: now,
            }),
        }
    }

    /// Stored score for (rank_list_id, user_id), if any.
    pub fn score(&self, rank_list_id: RankListId, user_id: UserId) -> Option<f64> {
        self.position(rank_list_id, user_id)
            .map(|idx| self.rows[idx].score)
    }

    /// All rows belonging to one rank list, in storage order.
    pub fn rows_for(&self, rank_list_id: RankListId) -> Vec<&ScoreRow> {
        self.rows
            .iter()
            .filter(|row| row.rank_list_id == rank_list_id)
            .collect()
    }

    fn position(&self, rank_list_id: RankListId, user_id: UserId) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.rank_list_id == rank_list_id && row.user_id == user_id)
    }
}

/// Load the score board from a JSON file.
///
/// If the file doesn't exist, returns a new empty board.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_score_board(path: &Path) -> Result<ScoreBoard> {
    if !path.exists() {
        return Ok(ScoreBoard::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open score board at {}", path.display()))?;

    let board: ScoreBoard = serde_json::from_reader(file).context("Failed to load score board")?;

    if board.version != 1 {
        anyhow::bail!("Unsupported score board version: {}", board.version);
    }

    Ok(board)
}

/// Save the score board to a JSON file atomically.
///
/// The whole board is committed in one atomic replace, so a batch of upserts
/// becomes visible all at once and a failed write leaves the previous file
/// intact.
pub fn save_score_board(path: &Path, board: &ScoreBoard) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, board).context("Failed to serialize score board")?;

    file.commit().context("Failed to save score board")?;

    Ok(())
}
