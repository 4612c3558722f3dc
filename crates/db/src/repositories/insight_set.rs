use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use storepulse_core::domain::insight::{Insight, InsightSet, InsightSetKey};
use storepulse_core::domain::sales::UserId;
use storepulse_core::errors::ApplicationError;
use storepulse_core::scheduler::InsightSetStore;

use super::RepositoryError;
use crate::DbPool;

/// One row per `(user_id, key_space, key_value)`. Upserts are last-writer-wins.
pub struct SqlInsightSetRepository {
    pool: DbPool,
}

impl SqlInsightSetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        user_id: &UserId,
        key: &InsightSetKey,
    ) -> Result<Option<InsightSet>, RepositoryError> {
        let row = sqlx::query(
            "SELECT user_id, key_space, key_value, insights_json, generated_at
             FROM insight_set
             WHERE user_id = ? AND key_space = ? AND key_value = ?",
        )
        .bind(&user_id.0)
        .bind(key.key_space())
        .bind(key.key_value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(insight_set_from_row).transpose()
    }

    pub async fn save(&self, set: &InsightSet) -> Result<(), RepositoryError> {
        let insights_json = serde_json::to_string(&set.insights)
            .map_err(|error| RepositoryError::Encode(format!("insights: {error}")))?;

        sqlx::query(
            "INSERT INTO insight_set (user_id, key_space, key_value, insights_json, generated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id, key_space, key_value) DO UPDATE SET
                insights_json = excluded.insights_json,
                generated_at = excluded.generated_at",
        )
        .bind(&set.user_id.0)
        .bind(set.key.key_space())
        .bind(set.key.key_value())
        .bind(insights_json)
        .bind(set.generated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count_for_user(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(1) FROM insight_set WHERE user_id = ?")
            .bind(&user_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl InsightSetStore for SqlInsightSetRepository {
    async fn find_insight_set(
        &self,
        user_id: &UserId,
        key: &InsightSetKey,
    ) -> Result<Option<InsightSet>, ApplicationError> {
        self.find(user_id, key).await.map_err(RepositoryError::into_read_failure)
    }

    async fn upsert_insight_set(&self, set: InsightSet) -> Result<(), ApplicationError> {
        self.save(&set).await.map_err(RepositoryError::into_write_failure)
    }
}

fn insight_set_from_row(row: SqliteRow) -> Result<InsightSet, RepositoryError> {
    let key_space = row.try_get::<String, _>("key_space")?;
    let key_value = row.try_get::<String, _>("key_value")?;
    let key = InsightSetKey::parse(&key_space, &key_value)
        .map_err(|error| RepositoryError::Decode(error.to_string()))?;

    let insights_json = row.try_get::<String, _>("insights_json")?;
    let insights: Vec<Insight> = serde_json::from_str(&insights_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid insights_json ({error})")))?;

    Ok(InsightSet {
        user_id: UserId(row.try_get("user_id")?),
        key,
        insights,
        generated_at: parse_timestamp("generated_at", row.try_get("generated_at")?)?,
    })
}

fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        },
    )
}
