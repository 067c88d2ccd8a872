use crate::domain::usage::{PlanTier, ResourceType, UsageRecord};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence seam for the usage ledger
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// `None` when the user does not exist
    async fn find_plan(&self, user_id: Uuid) -> AppResult<Option<PlanTier>>;

    /// Counters for the period starting at `period_start`; zeros if none recorded
    async fn find_usage(&self, user_id: Uuid, period_start: NaiveDate) -> AppResult<UsageRecord>;

    /// Increment one counter if it is below `limit` (or `limit` is unlimited),
    /// as a single atomic step. Returns the new value, or `None` when denied.
    async fn try_increment(
        &self,
        user_id: Uuid,
        resource: ResourceType,
        limit: i32,
        period_start: NaiveDate,
    ) -> AppResult<Option<i32>>;
}

pub struct UsageRepository {
    pool: Arc<DbPool>,
}

impl UsageRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for UsageRepository {
    async fn find_plan(&self, user_id: Uuid) -> AppResult<Option<PlanTier>> {
        let plan = sqlx::query_scalar::<_, String>("SELECT plan FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(plan.map(|p| PlanTier::from_stored(&p)))
    }

    async fn find_usage(&self, user_id: Uuid, period_start: NaiveDate) -> AppResult<UsageRecord> {
        let usage = sqlx::query_as::<_, UsageRecord>(
            r#"
            SELECT messages_used, images_used, code_generations_used
            FROM usage_limits
            WHERE user_id = $1 AND period_start >= $2
            "#,
        )
        .bind(user_id)
        .bind(period_start)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(usage.unwrap_or_default())
    }

    async fn try_increment(
        &self,
        user_id: Uuid,
        resource: ResourceType,
        limit: i32,
        period_start: NaiveDate,
    ) -> AppResult<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO usage_limits (user_id, period_start)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(period_start)
        .execute(&mut *tx)
        .await?;

        // Row from an earlier period starts over
        sqlx::query(
            r#"
            UPDATE usage_limits
            SET messages_used = 0,
                images_used = 0,
                code_generations_used = 0,
                period_start = $2,
                updated_at = NOW()
            WHERE user_id = $1 AND period_start < $2
            "#,
        )
        .bind(user_id)
        .bind(period_start)
        .execute(&mut *tx)
        .await?;

        // Check and increment in one statement; the row lock serializes concurrent callers
        let column = resource.column();
        let used = sqlx::query_scalar::<_, i32>(&format!(
            r#"
            UPDATE usage_limits
            SET {column} = {column} + 1, updated_at = NOW()
            WHERE user_id = $1 AND ($2::int = -1 OR {column} < $2::int)
            RETURNING {column}
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(used)
    }
}
