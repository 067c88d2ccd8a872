use crate::domain::usage::UsageServiceError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ImageServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Usage(#[from] UsageServiceError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ImageServiceError> for AppError {
    fn from(err: ImageServiceError) -> Self {
        match err {
            ImageServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ImageServiceError::Usage(e) => e.into(),
            ImageServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
