use super::ResourceType;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum UsageServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("{resource} limit exceeded ({used}/{limit})")]
    LimitExceeded {
        resource: ResourceType,
        limit: i32,
        used: i32,
    },
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("usage store error: {0}")]
    Store(#[source] sqlx::Error),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for UsageServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Database(e) => UsageServiceError::Store(e),
            AppError::BadRequest(msg) => UsageServiceError::Invalid(msg),
            AppError::NotFound(_) => UsageServiceError::UserNotFound,
            _ => UsageServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<UsageServiceError> for AppError {
    fn from(err: UsageServiceError) -> Self {
        match err {
            UsageServiceError::UserNotFound => AppError::NotFound("User not found".to_string()),
            UsageServiceError::LimitExceeded {
                resource,
                limit,
                used,
            } => AppError::UsageLimitExceeded {
                message: resource.limit_message().to_string(),
                limit,
                used,
            },
            UsageServiceError::Invalid(msg) => AppError::BadRequest(msg),
            UsageServiceError::Store(e) => AppError::Database(e),
            UsageServiceError::Dependency(msg) => AppError::Internal(msg),
            UsageServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
