use super::{
    error::UsageServiceError, ResetPeriod, Reservation, ResourceType, UsageSnapshot,
};
use crate::infrastructure::repositories::UsageStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Plan-tier quota gate in front of every provider call
pub struct UsageService {
    store: Arc<dyn UsageStore>,
    reset_period: ResetPeriod,
}

impl UsageService {
    pub fn new(store: Arc<dyn UsageStore>, reset_period: ResetPeriod) -> Self {
        Self {
            store,
            reset_period,
        }
    }

    /// Check the user's limit for `resource` and, if allowed, count one use.
    ///
    /// Denials do not write anything.
    pub async fn check_and_reserve(
        &self,
        user_id: Uuid,
        resource: ResourceType,
    ) -> Result<Reservation, UsageServiceError> {
        let plan = self
            .store
            .find_plan(user_id)
            .await?
            .ok_or(UsageServiceError::UserNotFound)?;

        let limit = plan.limits().for_resource(resource);
        let period_start = self.reset_period.period_start(Utc::now());

        match self
            .store
            .try_increment(user_id, resource, limit, period_start)
            .await?
        {
            Some(used) => {
                tracing::debug!(
                    user_id = %user_id,
                    resource = %resource,
                    plan = %plan,
                    used,
                    limit,
                    "Usage reserved"
                );
                Ok(Reservation::Allowed { used, limit })
            }
            None => {
                let used = self
                    .store
                    .find_usage(user_id, period_start)
                    .await?
                    .used(resource);
                tracing::info!(
                    user_id = %user_id,
                    resource = %resource,
                    plan = %plan,
                    used,
                    limit,
                    "Usage limit reached"
                );
                Ok(Reservation::Denied { used, limit })
            }
        }
    }

    /// Like [`Self::check_and_reserve`], but a denial is an error
    pub async fn require(
        &self,
        user_id: Uuid,
        resource: ResourceType,
    ) -> Result<i32, UsageServiceError> {
        match self.check_and_reserve(user_id, resource).await? {
            Reservation::Allowed { used, .. } => Ok(used),
            Reservation::Denied { used, limit } => Err(UsageServiceError::LimitExceeded {
                resource,
                limit,
                used,
            }),
        }
    }

    pub async fn usage_snapshot(&self, user_id: Uuid) -> Result<UsageSnapshot, UsageServiceError> {
        let plan = self
            .store
            .find_plan(user_id)
            .await?
            .ok_or(UsageServiceError::UserNotFound)?;

        let period_start = self.reset_period.period_start(Utc::now());
        let usage = self.store.find_usage(user_id, period_start).await?;

        Ok(UsageSnapshot {
            plan,
            limits: plan.limits(),
            usage,
        })
    }
}

/// Parse the `userId` field every endpoint carries
pub fn parse_user_id(raw: Option<&str>) -> Result<Uuid, UsageServiceError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UsageServiceError::Invalid("userId is required".to_string()))?;

    Uuid::parse_str(raw).map_err(|_| UsageServiceError::Invalid("Invalid userId".to_string()))
}

pub fn parse_resource(raw: Option<&str>) -> Result<ResourceType, UsageServiceError> {
    raw.and_then(|s| s.parse().ok()).ok_or_else(|| {
        UsageServiceError::Invalid("Invalid usage type. Use message, image or code.".to_string())
    })
}
