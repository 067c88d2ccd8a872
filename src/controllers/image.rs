use axum::{extract::State, Json};
use std::sync::Arc;

use super::{public_error, JsonBody};
use crate::{
    domain::image::{ImageRequest, ImageResponse, ImageService, ImageServiceApi},
    error::AppResult,
};

pub struct ImageController {
    image_service: Arc<ImageService>,
    expose_error_details: bool,
}

impl ImageController {
    pub fn new(image_service: Arc<ImageService>, expose_error_details: bool) -> Self {
        Self {
            image_service,
            expose_error_details,
        }
    }

    /// POST /api/image - Generate an image, never failing once the quota allows it
    pub async fn generate(
        State(controller): State<Arc<ImageController>>,
        JsonBody(request): JsonBody<ImageRequest>,
    ) -> AppResult<Json<ImageResponse>> {
        let response = controller
            .image_service
            .generate(request)
            .await
            .map_err(|e| public_error(e.into(), controller.expose_error_details))?;

        Ok(Json(response))
    }
}
