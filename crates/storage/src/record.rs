//! JSON shape of the persisted stats record.

use std::collections::BTreeSet;

use quiz_core::model::{Stats, StatsDraft};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Key the stats record is stored under.
pub const STATS_KEY: &str = "quiz.stats";

/// Persisted shape for [`Stats`].
///
/// Every field defaults, so payloads written before `totalAnswered` and
/// `bestRoundScore` existed still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsRecord {
    pub total_correct: u64,
    pub total_games: u64,
    pub best_streak_ever: u64,
    pub total_score: u64,
    pub perfect_rounds: u64,
    pub unlocked_ids: Vec<String>,
    pub total_answered: u64,
    pub best_round_score: u64,
}

impl StatsRecord {
    #[must_use]
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            total_correct: stats.total_correct(),
            total_games: stats.total_games(),
            best_streak_ever: stats.best_streak_ever(),
            total_score: stats.total_score(),
            perfect_rounds: stats.perfect_rounds(),
            unlocked_ids: stats.unlocked_achievement_ids().iter().cloned().collect(),
            total_answered: stats.total_answered(),
            best_round_score: stats.best_round_score(),
        }
    }

    #[must_use]
    pub fn into_stats(self) -> Stats {
        Stats::from_persisted(StatsDraft {
            total_correct: self.total_correct,
            total_answered: self.total_answered,
            total_games: self.total_games,
            best_streak_ever: self.best_streak_ever,
            total_score: self.total_score,
            best_round_score: self.best_round_score,
            perfect_rounds: self.perfect_rounds,
            unlocked_achievement_ids: self.unlocked_ids.into_iter().collect::<BTreeSet<_>>(),
        })
    }
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_stats(stats: &Stats) -> Result<String, StorageError> {
    serde_json::to_string(&StatsRecord::from_stats(stats))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a stored payload. Absent or unreadable payloads yield default stats.
#[must_use]
pub fn decode_stats(payload: Option<&str>) -> Stats {
    let Some(payload) = payload else {
        return Stats::default();
    };
    match serde_json::from_str::<StatsRecord>(payload) {
        Ok(record) => record.into_stats(),
        Err(err) => {
            tracing::warn!(error = %err, "stats record is corrupt, starting from defaults");
            Stats::default()
        }
    }
}
