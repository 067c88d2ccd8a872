use serde::{Deserialize, Serialize};

/// Request for POST /api/image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageRequest {
    pub prompt: String,
    pub user_id: Option<String>,
    /// `"emoji"` renders locally without contacting any vendor
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
    pub provider: String,
}
