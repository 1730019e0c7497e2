use std::sync::Arc;

use quiz_core::achievements::{Achievement, AchievementTracker};
use quiz_core::model::{RoundConfig, RoundSummary, Stats};
use quiz_core::random::RandomSource;
use quiz_core::round::RoundBuilder;
use quiz_core::source::QuestionSource;
use storage::repository::{RoundHistoryRepository, StatsStore};
use tokio::sync::{Mutex, watch};

use super::countdown::TickSettings;
use super::machine::RoundSession;
use super::runner::RoundRunner;
use crate::Clock;
use crate::error::SessionError;

/// What completing a round changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub summary: RoundSummary,
    /// Cumulative stats after merging this round.
    pub stats: Stats,
    /// Achievements unlocked by this round, in catalog order.
    pub newly_unlocked: Vec<&'static Achievement>,
    /// Row id in round history; `None` if the history append failed.
    pub history_id: Option<i64>,
}

/// Orchestrates round start and persisted completion.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    source: Arc<dyn QuestionSource + Send + Sync>,
    stats: Arc<dyn StatsStore>,
    history: Arc<dyn RoundHistoryRepository>,
    tracker: AchievementTracker,
    commit: Arc<Mutex<()>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource + Send + Sync>,
        stats: Arc<dyn StatsStore>,
        history: Arc<dyn RoundHistoryRepository>,
    ) -> Self {
        Self {
            clock,
            source,
            stats,
            history,
            tracker: AchievementTracker::new(),
            commit: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: AchievementTracker) -> Self {
        self.tracker = tracker;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Build the questions for `config` and wrap them in an idle session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Round` if the category is unknown, its pool is
    /// empty or too small under the configured shortfall policy.
    pub fn start_round<R: RandomSource + ?Sized>(
        &self,
        config: RoundConfig,
        rng: &mut R,
    ) -> Result<RoundSession, SessionError> {
        let size = usize::try_from(config.round_size()).unwrap_or(usize::MAX);
        let questions = RoundBuilder::new(self.source.as_ref()).build(
            config.category(),
            size,
            config.shortfall(),
            rng,
        )?;
        RoundSession::new(config, questions)
    }

    /// Runner for `session` using this service's clock.
    #[must_use]
    pub fn runner(
        &self,
        session: RoundSession,
        settings: watch::Receiver<TickSettings>,
    ) -> RoundRunner {
        RoundRunner::new(session, self.clock, settings)
    }

    /// Fold a completed round into stats, unlock achievements and append it
    /// to history.
    ///
    /// Calling this again for the same session returns the first report
    /// without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Cancelled` or `SessionError::NotCompleted` if
    /// the round did not finish, and `SessionError::Storage` if stored stats
    /// cannot be read or saved. Nothing is written when the read fails. A
    /// failed history append is logged, not returned.
    pub async fn complete_round(
        &self,
        session: &mut RoundSession,
    ) -> Result<CompletionReport, SessionError> {
        if let Some(report) = session.completion() {
            return Ok(report.clone());
        }
        let summary = session.summary()?;

        // Load, merge and save must not interleave with another completion.
        let _guard = self.commit.lock().await;
        let prior = self.stats.try_load_stats().await?;
        let evaluation = self.tracker.evaluate(&prior, &summary);
        self.stats.save_stats(&evaluation.stats).await?;

        let history_id = match self.history.append_round(&summary).await {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "failed to append round history");
                None
            }
        };

        tracing::info!(
            category = summary.category(),
            score = summary.score(),
            unlocked = evaluation.newly_unlocked.len(),
            "round persisted"
        );
        let report = CompletionReport {
            summary,
            stats: evaluation.stats,
            newly_unlocked: evaluation.newly_unlocked,
            history_id,
        };
        session.set_completion(report.clone());
        Ok(report)
    }
}
