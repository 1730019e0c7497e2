use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies versioned schema migrations recorded in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: key-value records and round history.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS key_value (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS round_history (
                    id INTEGER PRIMARY KEY,
                    category TEXT NOT NULL,
                    tier TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    completed_at TEXT NOT NULL,
                    total_questions INTEGER NOT NULL CHECK (total_questions >= 0),
                    correct INTEGER NOT NULL CHECK (correct >= 0 AND correct <= total_questions),
                    score INTEGER NOT NULL CHECK (score >= 0),
                    best_streak INTEGER NOT NULL CHECK (best_streak >= 0),
                    perfect INTEGER NOT NULL CHECK (perfect IN (0, 1))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_round_history_category_completed
                    ON round_history (category, completed_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
