use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::question::AnswerResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoundSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many results for a single round: {len}")]
    TooManyResults { len: usize },

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CountMismatch { correct: u32, total: u32 },
}

/// Aggregate of one finished round; the unit folded into cumulative stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    category: String,
    tier: String,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    correct: u32,
    score: u64,
    best_streak: u32,
}

impl RoundSummary {
    /// Rehydrate a summary from persisted history.
    ///
    /// # Errors
    ///
    /// Returns `RoundSummaryError` if the time range is inverted or the
    /// correct count exceeds the total.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        category: impl Into<String>,
        tier: impl Into<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_questions: u32,
        correct: u32,
        score: u64,
        best_streak: u32,
    ) -> Result<Self, RoundSummaryError> {
        if completed_at < started_at {
            return Err(RoundSummaryError::InvalidTimeRange);
        }
        if correct > total_questions {
            return Err(RoundSummaryError::CountMismatch {
                correct,
                total: total_questions,
            });
        }

        Ok(Self {
            category: category.into(),
            tier: tier.into(),
            started_at,
            completed_at,
            total_questions,
            correct,
            score,
            best_streak,
        })
    }

    /// Build a summary from a round's final results.
    ///
    /// # Errors
    ///
    /// Returns `RoundSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `RoundSummaryError::TooManyResults` if the result count cannot fit in `u32`.
    pub fn from_results(
        category: impl Into<String>,
        tier: impl Into<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        results: &[AnswerResult],
    ) -> Result<Self, RoundSummaryError> {
        let total = u32::try_from(results.len())
            .map_err(|_| RoundSummaryError::TooManyResults { len: results.len() })?;

        let mut correct = 0_u32;
        let mut score = 0_u64;
        let mut best_streak = 0_u32;
        for result in results {
            if result.correct {
                correct = correct.saturating_add(1);
            }
            score = score.saturating_add(u64::from(result.points_awarded));
            best_streak = best_streak.max(result.streak_after);
        }

        Self::from_persisted(
            category,
            tier,
            started_at,
            completed_at,
            total,
            correct,
            score,
            best_streak,
        )
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn tier(&self) -> &str {
        &self.tier
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Every question answered correctly. An empty round is never perfect.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct == self.total_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Question;
    use crate::model::{ProblemEntry, Value, ValueKind};
    use crate::time::fixed_now;

    fn result(correct: bool, points: u32, streak_after: u32) -> AnswerResult {
        let entry =
            ProblemEntry::new("math", "1 + 1", Value::Integer(2), ValueKind::Integer).unwrap();
        let distractors = [Value::Integer(3), Value::Integer(4), Value::Integer(5)];
        AnswerResult {
            question: Question::assemble(&entry, &distractors, [0, 1, 2, 3]).unwrap(),
            chosen_label: Some(if correct { "2" } else { "3" }.into()),
            correct,
            points_awarded: points,
            time_used_secs: 2,
            streak_after,
        }
    }

    #[test]
    fn summary_totals_results() {
        let now = fixed_now();
        let results = vec![
            result(true, 30, 1),
            result(true, 30, 2),
            result(false, 0, 0),
            result(true, 25, 1),
        ];

        let summary = RoundSummary::from_results("math", "normal", now, now, &results).unwrap();

        assert_eq!(summary.total_questions(), 4);
        assert_eq!(summary.correct(), 3);
        assert_eq!(summary.score(), 85);
        assert_eq!(summary.best_streak(), 2);
        assert!(!summary.is_perfect());
    }

    #[test]
    fn perfect_requires_at_least_one_question() {
        let now = fixed_now();
        let empty = RoundSummary::from_results("math", "normal", now, now, &[]).unwrap();
        assert!(!empty.is_perfect());

        let all = RoundSummary::from_results("math", "normal", now, now, &[result(true, 10, 1)])
            .unwrap();
        assert!(all.is_perfect());
    }

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = RoundSummary::from_results(
            "math",
            "normal",
            now,
            now - chrono::Duration::seconds(1),
            &[],
        )
        .unwrap_err();
        assert_eq!(err, RoundSummaryError::InvalidTimeRange);
    }

    #[test]
    fn persisted_rejects_count_mismatch() {
        let now = fixed_now();
        let err = RoundSummary::from_persisted("math", "hard", now, now, 2, 3, 0, 0).unwrap_err();
        assert!(matches!(err, RoundSummaryError::CountMismatch { .. }));
    }
}
