use async_trait::async_trait;
use quiz_core::model::{RoundSummary, Stats};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::record::{STATS_KEY, decode_stats, encode_stats};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Raw string key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Durable record of cumulative stats and unlocked achievement ids.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Load the stats record. Never fails: a missing record, a corrupt
    /// payload or an unreadable backend all yield default stats.
    async fn load_stats(&self) -> Stats;

    /// Load the stats record for a read-modify-write. A missing or corrupt
    /// payload still yields default stats, but a backend read failure is
    /// returned so the caller never saves over a record it could not read.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn try_load_stats(&self) -> Result<Stats, StorageError>;

    /// Replace the stats record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or stored.
    async fn save_stats(&self, stats: &Stats) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> StatsStore for T {
    async fn load_stats(&self) -> Stats {
        match self.try_load_stats().await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stats, starting from defaults");
                Stats::default()
            }
        }
    }

    async fn try_load_stats(&self) -> Result<Stats, StorageError> {
        let payload = self.get_value(STATS_KEY).await?;
        Ok(decode_stats(payload.as_deref()))
    }

    async fn save_stats(&self, stats: &Stats) -> Result<(), StorageError> {
        let payload = encode_stats(stats)?;
        self.put_value(STATS_KEY, &payload).await
    }
}

/// Append-only log of finished rounds.
#[async_trait]
pub trait RoundHistoryRepository: Send + Sync {
    /// Append a finished round and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the round cannot be stored.
    async fn append_round(&self, summary: &RoundSummary) -> Result<i64, StorageError>;

    /// Most recent rounds first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails or a row cannot be decoded.
    async fn list_recent(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RoundSummary>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, String>>>,
    rounds: Arc<Mutex<Vec<RoundSummary>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
            rounds: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[async_trait]
impl RoundHistoryRepository for InMemoryRepository {
    async fn append_round(&self, summary: &RoundSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .rounds
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(summary.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn list_recent(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RoundSummary>, StorageError> {
        let guard = self
            .rounds
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<(usize, &RoundSummary)> = guard
            .iter()
            .enumerate()
            .filter(|(_, s)| category.is_none_or(|c| s.category() == c))
            .collect();
        // Newest completion first; later appends win ties.
        rows.sort_by(|(ia, a), (ib, b)| {
            b.completed_at()
                .cmp(&a.completed_at())
                .then_with(|| ib.cmp(ia))
        });
        Ok(rows
            .into_iter()
            .take(limit as usize)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn StatsStore>,
    pub history: Arc<dyn RoundHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let stats: Arc<dyn StatsStore> = Arc::new(repo.clone());
        let history: Arc<dyn RoundHistoryRepository> = Arc::new(repo);
        Self { stats, history }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    fn summary(category: &str, minutes: i64, score: u64) -> RoundSummary {
        let start = fixed_now() + Duration::minutes(minutes);
        RoundSummary::from_persisted(category, "normal", start, start, 5, 3, score, 2).unwrap()
    }

    #[tokio::test]
    async fn stats_round_trip_through_key_value() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_stats().await, Stats::default());

        let mut stats = Stats::default().merge_round(&summary("food", 0, 90));
        stats.unlock("first_round");
        repo.save_stats(&stats).await.unwrap();

        assert_eq!(repo.load_stats().await, stats);
    }

    #[tokio::test]
    async fn corrupt_payload_loads_as_default() {
        let repo = InMemoryRepository::new();
        repo.put_value(STATS_KEY, "{not json").await.unwrap();
        assert_eq!(repo.load_stats().await, Stats::default());
    }

    struct UnreadableStore;

    #[async_trait]
    impl KeyValueStore for UnreadableStore {
        async fn get_value(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("database is locked".into()))
        }

        async fn put_value(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn read_failure_is_an_error_for_try_load_only() {
        let store = UnreadableStore;
        assert!(matches!(
            store.try_load_stats().await,
            Err(StorageError::Connection(_))
        ));
        assert_eq!(store.load_stats().await, Stats::default());

        let repo = InMemoryRepository::new();
        repo.put_value(STATS_KEY, "{not json").await.unwrap();
        assert_eq!(repo.try_load_stats().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn history_lists_newest_first_with_filter() {
        let repo = InMemoryRepository::new();
        repo.append_round(&summary("food", 1, 10)).await.unwrap();
        repo.append_round(&summary("hex", 2, 20)).await.unwrap();
        repo.append_round(&summary("food", 3, 30)).await.unwrap();

        let all = repo.list_recent(None, 10).await.unwrap();
        let scores: Vec<u64> = all.iter().map(RoundSummary::score).collect();
        assert_eq!(scores, [30, 20, 10]);

        let food = repo.list_recent(Some("food"), 1).await.unwrap();
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].score(), 30);
    }

    #[tokio::test]
    async fn storage_aggregate_shares_one_backend() {
        let storage = Storage::in_memory();
        let stats = Stats::default().merge_round(&summary("food", 0, 40));
        storage.stats.save_stats(&stats).await.unwrap();
        storage.history.append_round(&summary("food", 0, 40)).await.unwrap();

        assert_eq!(storage.stats.load_stats().await.total_games(), 1);
        assert_eq!(storage.history.list_recent(None, 5).await.unwrap().len(), 1);
    }
}
