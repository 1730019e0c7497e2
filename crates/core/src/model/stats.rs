use std::collections::BTreeSet;

use crate::model::summary::RoundSummary;

/// Persisted field values for [`Stats`], used by storage adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsDraft {
    pub total_correct: u64,
    pub total_answered: u64,
    pub total_games: u64,
    pub best_streak_ever: u64,
    pub total_score: u64,
    pub best_round_score: u64,
    pub perfect_rounds: u64,
    pub unlocked_achievement_ids: BTreeSet<String>,
}

/// Cumulative, cross-session player statistics.
///
/// Only changes through [`Stats::merge_round`] and [`Stats::unlock`], both
/// of which are monotonic: counters never go down and unlocked ids are never
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    total_correct: u64,
    total_answered: u64,
    total_games: u64,
    best_streak_ever: u64,
    total_score: u64,
    best_round_score: u64,
    perfect_rounds: u64,
    unlocked_achievement_ids: BTreeSet<String>,
}

impl Stats {
    #[must_use]
    pub fn from_persisted(draft: StatsDraft) -> Self {
        Self {
            total_correct: draft.total_correct,
            total_answered: draft.total_answered,
            total_games: draft.total_games,
            best_streak_ever: draft.best_streak_ever,
            total_score: draft.total_score,
            best_round_score: draft.best_round_score,
            perfect_rounds: draft.perfect_rounds,
            unlocked_achievement_ids: draft.unlocked_achievement_ids,
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> StatsDraft {
        StatsDraft {
            total_correct: self.total_correct,
            total_answered: self.total_answered,
            total_games: self.total_games,
            best_streak_ever: self.best_streak_ever,
            total_score: self.total_score,
            best_round_score: self.best_round_score,
            perfect_rounds: self.perfect_rounds,
            unlocked_achievement_ids: self.unlocked_achievement_ids.clone(),
        }
    }

    /// Fold one finished round into the running totals.
    ///
    /// Sums saturate instead of wrapping; maxima only move up.
    #[must_use]
    pub fn merge_round(&self, round: &RoundSummary) -> Self {
        let mut next = self.clone();
        next.total_correct = next.total_correct.saturating_add(u64::from(round.correct()));
        next.total_answered = next
            .total_answered
            .saturating_add(u64::from(round.total_questions()));
        next.total_games = next.total_games.saturating_add(1);
        next.best_streak_ever = next.best_streak_ever.max(u64::from(round.best_streak()));
        next.total_score = next.total_score.saturating_add(round.score());
        next.best_round_score = next.best_round_score.max(round.score());
        if round.is_perfect() {
            next.perfect_rounds = next.perfect_rounds.saturating_add(1);
        }
        next
    }

    /// Record an unlocked achievement. Returns `false` if it was already present.
    pub fn unlock(&mut self, id: impl Into<String>) -> bool {
        self.unlocked_achievement_ids.insert(id.into())
    }

    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_achievement_ids.contains(id)
    }

    /// True when every counter of `self` is at least the matching counter of
    /// `earlier` and no unlocked id has disappeared.
    #[must_use]
    pub fn dominates(&self, earlier: &Stats) -> bool {
        self.total_correct >= earlier.total_correct
            && self.total_answered >= earlier.total_answered
            && self.total_games >= earlier.total_games
            && self.best_streak_ever >= earlier.best_streak_ever
            && self.total_score >= earlier.total_score
            && self.best_round_score >= earlier.best_round_score
            && self.perfect_rounds >= earlier.perfect_rounds
            && self
                .unlocked_achievement_ids
                .is_superset(&earlier.unlocked_achievement_ids)
    }

    #[must_use]
    pub fn total_correct(&self) -> u64 {
        self.total_correct
    }

    #[must_use]
    pub fn total_answered(&self) -> u64 {
        self.total_answered
    }

    #[must_use]
    pub fn total_games(&self) -> u64 {
        self.total_games
    }

    #[must_use]
    pub fn best_streak_ever(&self) -> u64 {
        self.best_streak_ever
    }

    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    #[must_use]
    pub fn best_round_score(&self) -> u64 {
        self.best_round_score
    }

    #[must_use]
    pub fn perfect_rounds(&self) -> u64 {
        self.perfect_rounds
    }

    #[must_use]
    pub fn unlocked_achievement_ids(&self) -> &BTreeSet<String> {
        &self.unlocked_achievement_ids
    }

    /// Lifetime accuracy in `[0, 1]`, or `None` before the first answer.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_answered == 0 {
            return None;
        }
        Some(self.total_correct as f64 / self.total_answered as f64)
    }
}
