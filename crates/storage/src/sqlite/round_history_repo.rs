use quiz_core::model::RoundSummary;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{RoundHistoryRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_round_row(row: &sqlx::sqlite::SqliteRow) -> Result<RoundSummary, StorageError> {
    let category: String = row.try_get("category").map_err(ser)?;
    let tier: String = row.try_get("tier").map_err(ser)?;
    let started_at = row.try_get("started_at").map_err(ser)?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let score_i64: i64 = row.try_get("score").map_err(ser)?;
    let score = u64::try_from(score_i64)
        .map_err(|_| StorageError::Serialization(format!("invalid score: {score_i64}")))?;
    let best_streak = u32_from_i64(
        "best_streak",
        row.try_get::<i64, _>("best_streak").map_err(ser)?,
    )?;

    RoundSummary::from_persisted(
        category,
        tier,
        started_at,
        completed_at,
        total_questions,
        correct,
        score,
        best_streak,
    )
    .map_err(ser)
}

#[async_trait::async_trait]
impl RoundHistoryRepository for SqliteRepository {
    async fn append_round(&self, summary: &RoundSummary) -> Result<i64, StorageError> {
        let score = i64::try_from(summary.score())
            .map_err(|_| StorageError::Serialization("score overflow".into()))?;

        let res = sqlx::query(
            r"
                INSERT INTO round_history (
                    category, tier, started_at, completed_at,
                    total_questions, correct, score, best_streak, perfect
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(summary.category())
        .bind(summary.tier())
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .bind(i64::from(summary.total_questions()))
        .bind(i64::from(summary.correct()))
        .bind(score)
        .bind(i64::from(summary.best_streak()))
        .bind(i64::from(summary.is_perfect()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn list_recent(
        &self,
        category: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RoundSummary>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT
                    category, tier, started_at, completed_at,
                    total_questions, correct, score, best_streak
                FROM round_history
            ",
        );
        if category.is_some() {
            sql.push_str(" WHERE category = ?1");
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?1");
        }

        let mut query = sqlx::query(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_round_row(&row)?);
        }

        Ok(out)
    }
}
