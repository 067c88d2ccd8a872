pub mod chat;
pub mod health;
pub mod image;
pub mod usage;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Drop diagnostics unless the deployment allows showing them
pub(crate) fn public_error(err: AppError, expose_details: bool) -> AppError {
    if expose_details {
        err
    } else {
        err.redacted()
    }
}

/// `Json` extractor whose rejections use the regular error body
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}
