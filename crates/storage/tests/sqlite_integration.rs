use chrono::Duration;
use quiz_core::model::{RoundSummary, Stats};
use quiz_core::time::fixed_now;
use storage::record::STATS_KEY;
use storage::repository::{KeyValueStore, RoundHistoryRepository, StatsStore, Storage};
use storage::sqlite::SqliteRepository;

fn summary(category: &str, minutes: i64, correct: u32, score: u64) -> RoundSummary {
    let started = fixed_now() + Duration::minutes(minutes);
    let completed = started + Duration::seconds(90);
    RoundSummary::from_persisted(category, "hard", started, completed, 10, correct, score, correct)
        .unwrap()
}

#[tokio::test]
async fn sqlite_stats_round_trip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_stats?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.load_stats().await, Stats::default());

    let first = Stats::default().merge_round(&summary("food", 0, 10, 450));
    repo.save_stats(&first).await.unwrap();
    let mut second = first.merge_round(&summary("food", 5, 7, 200));
    second.unlock("perfect_round");
    repo.save_stats(&second).await.unwrap();

    let loaded = repo.load_stats().await;
    assert_eq!(loaded, second);
    assert_eq!(loaded.total_games(), 2);
    assert_eq!(loaded.best_round_score(), 450);
}

#[tokio::test]
async fn sqlite_corrupt_stats_payload_loads_defaults() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_value(STATS_KEY, "{\"totalCorrect\": \"lots\"}")
        .await
        .unwrap();
    assert_eq!(repo.load_stats().await, Stats::default());
}

#[tokio::test]
async fn sqlite_history_orders_and_filters() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let a = repo.append_round(&summary("hex", 0, 10, 520)).await.unwrap();
    let b = repo.append_round(&summary("food", 10, 3, 60)).await.unwrap();
    let c = repo.append_round(&summary("hex", 20, 6, 140)).await.unwrap();
    assert!(a < b && b < c);

    let recent = repo.list_recent(None, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].score(), 140);
    assert_eq!(recent[1].score(), 60);

    let hex = repo.list_recent(Some("hex"), 10).await.unwrap();
    assert_eq!(hex.len(), 2);
    assert!(hex.iter().all(|s| s.category() == "hex"));
    assert!(hex[1].is_perfect());
    assert_eq!(hex[1].completed_at() - hex[1].started_at(), Duration::seconds(90));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_wires_both_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let round = summary("colors", 0, 4, 80);
    storage
        .stats
        .save_stats(&Stats::default().merge_round(&round))
        .await
        .unwrap();
    storage.history.append_round(&round).await.unwrap();

    assert_eq!(storage.stats.load_stats().await.total_correct(), 4);
    assert_eq!(storage.history.list_recent(None, 10).await.unwrap(), vec![round]);
}
