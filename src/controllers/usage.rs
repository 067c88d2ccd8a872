use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::{public_error, JsonBody};
use crate::{
    domain::usage::{
        parse_resource, parse_user_id, Reservation, TrackUsageRequest, TrackUsageResponse,
        UsageLimitsQuery, UsageService, UsageServiceError, UsageSnapshot,
    },
    error::AppResult,
};

pub struct UsageController {
    usage_service: Arc<UsageService>,
    expose_error_details: bool,
}

impl UsageController {
    pub fn new(usage_service: Arc<UsageService>, expose_error_details: bool) -> Self {
        Self {
            usage_service,
            expose_error_details,
        }
    }

    /// POST /api/usage/track - Count one use of a resource against the user's plan
    pub async fn track(
        State(controller): State<Arc<UsageController>>,
        JsonBody(request): JsonBody<TrackUsageRequest>,
    ) -> AppResult<Json<TrackUsageResponse>> {
        controller
            .track_usage(request)
            .await
            .map(Json)
            .map_err(|e| public_error(e.into(), controller.expose_error_details))
    }

    /// GET /api/usage/limits?userId= - Plan, limits and current counters
    pub async fn limits(
        State(controller): State<Arc<UsageController>>,
        Query(query): Query<UsageLimitsQuery>,
    ) -> AppResult<Json<UsageSnapshot>> {
        controller
            .snapshot(query)
            .await
            .map(Json)
            .map_err(|e| public_error(e.into(), controller.expose_error_details))
    }

    async fn track_usage(
        &self,
        request: TrackUsageRequest,
    ) -> Result<TrackUsageResponse, UsageServiceError> {
        let user_id = parse_user_id(request.user_id.as_deref())?;
        let resource = parse_resource(request.resource.as_deref())?;

        match self.usage_service.check_and_reserve(user_id, resource).await? {
            Reservation::Allowed { used, limit } => Ok(TrackUsageResponse {
                success: true,
                used,
                limit,
            }),
            Reservation::Denied { used, limit } => Err(UsageServiceError::LimitExceeded {
                resource,
                limit,
                used,
            }),
        }
    }

    async fn snapshot(&self, query: UsageLimitsQuery) -> Result<UsageSnapshot, UsageServiceError> {
        let user_id = parse_user_id(query.user_id.as_deref())?;
        self.usage_service.usage_snapshot(user_id).await
    }
}
