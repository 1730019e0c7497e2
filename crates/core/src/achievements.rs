//! Achievement catalog and evaluation.
//!
//! Ids are persisted in player stats and must never be reused for a
//! different predicate.

use crate::model::{RoundSummary, Stats};

/// One static achievement rule.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    predicate: fn(&Stats) -> bool,
}

impl Achievement {
    #[must_use]
    pub fn is_met(&self, stats: &Stats) -> bool {
        (self.predicate)(stats)
    }
}

impl PartialEq for Achievement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Achievement {}

pub static CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_round",
        title: "First Steps",
        description: "Finish your first round",
        predicate: |s| s.total_games() >= 1,
    },
    Achievement {
        id: "ten_correct",
        title: "Getting There",
        description: "Answer 10 questions correctly",
        predicate: |s| s.total_correct() >= 10,
    },
    Achievement {
        id: "hundred_correct",
        title: "Century",
        description: "Answer 100 questions correctly",
        predicate: |s| s.total_correct() >= 100,
    },
    Achievement {
        id: "streak_5",
        title: "On Fire",
        description: "Reach a streak of 5",
        predicate: |s| s.best_streak_ever() >= 5,
    },
    Achievement {
        id: "streak_10",
        title: "Unstoppable",
        description: "Reach a streak of 10",
        predicate: |s| s.best_streak_ever() >= 10,
    },
    Achievement {
        id: "perfect_round",
        title: "Flawless",
        description: "Answer every question in a round correctly",
        predicate: |s| s.perfect_rounds() >= 1,
    },
    Achievement {
        id: "five_perfect_rounds",
        title: "Perfectionist",
        description: "Finish 5 perfect rounds",
        predicate: |s| s.perfect_rounds() >= 5,
    },
    Achievement {
        id: "score_1000",
        title: "High Scorer",
        description: "Earn 1,000 points in total",
        predicate: |s| s.total_score() >= 1_000,
    },
    Achievement {
        id: "score_10000",
        title: "Point Hoarder",
        description: "Earn 10,000 points in total",
        predicate: |s| s.total_score() >= 10_000,
    },
    Achievement {
        id: "games_10",
        title: "Regular",
        description: "Play 10 rounds",
        predicate: |s| s.total_games() >= 10,
    },
    Achievement {
        id: "games_50",
        title: "Dedicated",
        description: "Play 50 rounds",
        predicate: |s| s.total_games() >= 50,
    },
    Achievement {
        id: "high_roller",
        title: "High Roller",
        description: "Score 500 points in a single round",
        predicate: |s| s.best_round_score() >= 500,
    },
];

#[must_use]
pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Result of folding a round into stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub stats: Stats,
    /// In catalog order.
    pub newly_unlocked: Vec<&'static Achievement>,
}

/// Evaluates the catalog against cumulative stats. Never revokes.
#[derive(Debug, Clone, Copy)]
pub struct AchievementTracker {
    catalog: &'static [Achievement],
}

impl Default for AchievementTracker {
    fn default() -> Self {
        Self { catalog: CATALOG }
    }
}

impl AchievementTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_catalog(catalog: &'static [Achievement]) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &'static [Achievement] {
        self.catalog
    }

    /// Merge `round` into `prior`, then unlock every achievement whose
    /// predicate now holds and that was not unlocked before.
    #[must_use]
    pub fn evaluate(&self, prior: &Stats, round: &RoundSummary) -> Evaluation {
        self.unlock_pending(prior.merge_round(round))
    }

    /// Unlock whatever `stats` already qualifies for without merging a round.
    /// Useful after loading stats written by an older catalog.
    #[must_use]
    pub fn unlock_pending(&self, mut stats: Stats) -> Evaluation {
        let mut newly_unlocked = Vec::new();
        for achievement in self.catalog {
            if !stats.is_unlocked(achievement.id) && achievement.is_met(&stats) {
                stats.unlock(achievement.id);
                tracing::info!(id = achievement.id, "achievement unlocked");
                newly_unlocked.push(achievement);
            }
        }
        Evaluation {
            stats,
            newly_unlocked,
        }
    }
}
