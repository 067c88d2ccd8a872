use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackUsageRequest {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub resource: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackUsageResponse {
    pub success: bool,
    pub used: i32,
    pub limit: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimitsQuery {
    pub user_id: Option<String>,
}
