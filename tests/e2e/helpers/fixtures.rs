use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Counters as stored in `usage_limits`
#[derive(Debug, Default, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct StoredUsage {
    pub messages_used: i32,
    pub images_used: i32,
    pub code_generations_used: i32,
}

pub struct TestFixtures {
    pool: PgPool,
}

impl TestFixtures {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user on the given plan and return its id
    pub async fn create_user(&self, plan: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query("INSERT INTO users (id, plan) VALUES ($1, $2)")
            .bind(id)
            .bind(plan)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    /// Set the user's counters for the current period
    pub async fn set_usage(&self, user_id: Uuid, usage: StoredUsage) -> Result<()> {
        self.upsert_usage(user_id, usage, "CURRENT_DATE").await
    }

    /// Set counters that belong to a period that has already ended
    pub async fn set_stale_usage(&self, user_id: Uuid, usage: StoredUsage) -> Result<()> {
        self.upsert_usage(user_id, usage, "(CURRENT_DATE - INTERVAL '40 days')::date")
            .await
    }

    /// Stored counters, zeros when the user has no usage row yet
    pub async fn usage_of(&self, user_id: Uuid) -> Result<StoredUsage> {
        let usage = sqlx::query_as::<_, StoredUsage>(
            r#"
            SELECT messages_used, images_used, code_generations_used
            FROM usage_limits
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage.unwrap_or_default())
    }

    async fn upsert_usage(
        &self,
        user_id: Uuid,
        usage: StoredUsage,
        period_start: &str,
    ) -> Result<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO usage_limits (
                user_id, messages_used, images_used, code_generations_used, period_start
            )
            VALUES ($1, $2, $3, $4, {period_start})
            ON CONFLICT (user_id) DO UPDATE SET
                messages_used = EXCLUDED.messages_used,
                images_used = EXCLUDED.images_used,
                code_generations_used = EXCLUDED.code_generations_used,
                period_start = EXCLUDED.period_start
            "#
        ))
        .bind(user_id)
        .bind(usage.messages_used)
        .bind(usage.images_used)
        .bind(usage.code_generations_used)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

pub fn messages(used: i32) -> StoredUsage {
    StoredUsage {
        messages_used: used,
        ..StoredUsage::default()
    }
}

pub fn images(used: i32) -> StoredUsage {
    StoredUsage {
        images_used: used,
        ..StoredUsage::default()
    }
}

pub fn code_generations(used: i32) -> StoredUsage {
    StoredUsage {
        code_generations_used: used,
        ..StoredUsage::default()
    }
}
