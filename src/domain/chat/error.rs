use crate::domain::usage::UsageServiceError;
use crate::error::AppError;
use crate::infrastructure::providers::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Usage(#[from] UsageServiceError),
    #[error("provider chain failed: {}", .0.kind)]
    Provider(ProviderError),
    #[error("no provider configured")]
    NoProviderConfigured,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ChatServiceError> for AppError {
    fn from(err: ChatServiceError) -> Self {
        match err {
            ChatServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ChatServiceError::Usage(e) => e.into(),
            ChatServiceError::Provider(e) => upstream(e),
            ChatServiceError::NoProviderConfigured => AppError::NoProviderConfigured,
            ChatServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// Friendly message for the kind; the vendor's own text goes to `details`
fn upstream(error: ProviderError) -> AppError {
    AppError::Upstream {
        kind: error.kind,
        message: error.kind.user_message().to_string(),
        details: Some(error.message),
    }
}
