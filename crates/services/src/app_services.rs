use std::sync::Arc;

use quiz_core::random::RandomSource;
use quiz_core::source::{CategoryCatalog, QuestionSource};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::QuizLoopService;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend and catalog.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CategoryCatalog>,
    quiz_loop: Arc<QuizLoopService>,
    stats: Arc<StatsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog
    /// generation fails.
    pub async fn new_sqlite<R: RandomSource + ?Sized>(
        db_url: &str,
        clock: Clock,
        rng: &mut R,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(storage, clock, rng)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog generation fails.
    pub fn in_memory<R: RandomSource + ?Sized>(
        clock: Clock,
        rng: &mut R,
    ) -> Result<Self, AppServicesError> {
        Self::with_storage(Storage::in_memory(), clock, rng)
    }

    fn with_storage<R: RandomSource + ?Sized>(
        storage: Storage,
        clock: Clock,
        rng: &mut R,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(CategoryCatalog::builtin(rng)?);
        let source: Arc<dyn QuestionSource + Send + Sync> = catalog.clone();
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            source,
            Arc::clone(&storage.stats),
            Arc::clone(&storage.history),
        ));
        let stats = Arc::new(StatsService::new(
            Arc::clone(&storage.stats),
            Arc::clone(&storage.history),
        ));
        Ok(Self {
            catalog,
            quiz_loop,
            stats,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CategoryCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }
}
