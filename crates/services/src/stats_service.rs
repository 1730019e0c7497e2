//! Read-only views over cumulative stats and round history.

use std::sync::Arc;

use quiz_core::achievements::{Achievement, AchievementTracker};
use quiz_core::model::{RoundSummary, Stats};
use storage::repository::{RoundHistoryRepository, StatsStore, StorageError};

/// An achievement alongside whether the player has it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementStatus {
    pub achievement: &'static Achievement,
    pub unlocked: bool,
}

#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsStore>,
    history: Arc<dyn RoundHistoryRepository>,
    tracker: AchievementTracker,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsStore>, history: Arc<dyn RoundHistoryRepository>) -> Self {
        Self {
            stats,
            history,
            tracker: AchievementTracker::new(),
        }
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: AchievementTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Current cumulative stats. Defaults when nothing is stored yet.
    pub async fn stats(&self) -> Stats {
        self.stats.load_stats().await
    }

    /// The full catalog in order, each flagged with its unlocked state.
    pub async fn achievements(&self) -> Vec<AchievementStatus> {
        let stats = self.stats.load_stats().await;
        self.tracker
            .catalog()
            .iter()
            .map(|achievement| AchievementStatus {
                achievement,
                unlocked: stats.is_unlocked(achievement.id),
            })
            .collect()
    }

    /// Most recent rounds first, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if history cannot be read.
    pub async fn recent_rounds(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RoundSummary>, StorageError> {
        self.history.list_recent(category, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> StatsService {
        StatsService::new(Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn fresh_store_has_nothing_unlocked() {
        let repo = InMemoryRepository::new();
        let service = service(&repo);
        assert_eq!(service.stats().await, Stats::default());

        let statuses = service.achievements().await;
        assert_eq!(statuses.len(), quiz_core::achievements::CATALOG.len());
        assert!(statuses.iter().all(|s| !s.unlocked));
        assert!(service.recent_rounds(None, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reflects_saved_stats_and_history() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        let round = RoundSummary::from_persisted("logic", "easy", now, now, 4, 4, 90, 4).unwrap();
        let eval = AchievementTracker::new().evaluate(&Stats::default(), &round);
        repo.save_stats(&eval.stats).await.unwrap();
        repo.append_round(&round).await.unwrap();

        let service = service(&repo);
        let unlocked: Vec<&str> = service
            .achievements()
            .await
            .into_iter()
            .filter(|s| s.unlocked)
            .map(|s| s.achievement.id)
            .collect();
        assert_eq!(unlocked, ["first_round", "perfect_round"]);
        assert_eq!(service.recent_rounds(Some("logic"), 5).await.unwrap(), vec![round]);
        assert!(service.recent_rounds(Some("food"), 5).await.unwrap().is_empty());
    }
}
