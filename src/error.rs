use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::providers::ProviderErrorKind;

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Usage store is unavailable")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Application-level plan quota, detected before any provider is contacted
    #[error("{message}")]
    UsageLimitExceeded {
        message: String,
        limit: i32,
        used: i32,
    },

    /// Classified outcome of a failed provider chain
    #[error("{message}")]
    Upstream {
        kind: ProviderErrorKind,
        message: String,
        details: Option<String>,
    },

    #[error("No AI provider is configured. Set OPENAI_API_KEY or GROQ_API_KEY.")]
    NoProviderConfigured,

    #[error("Internal server error")]
    Internal(String),
}

/// Error body: `{error, details?, limit?, used?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<i32>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UsageLimitExceeded { .. } => StatusCode::FORBIDDEN,
            Self::Upstream { kind, .. } => match kind {
                ProviderErrorKind::Auth => StatusCode::UNAUTHORIZED,
                ProviderErrorKind::QuotaExceeded | ProviderErrorKind::RateLimited => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                ProviderErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ProviderErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            },
            Self::Database(_) | Self::NoProviderConfigured | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Diagnostic text that may only be shown outside production
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Database(e) => Some(e.to_string()),
            Self::Upstream { details, .. } => details.clone(),
            Self::Internal(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    /// Strip diagnostics before the error crosses the API boundary.
    pub fn redacted(self) -> Self {
        match self {
            Self::Database(_) | Self::Internal(_) => Self::Internal(String::new()),
            Self::Upstream { kind, message, .. } => Self::Upstream {
                kind,
                message,
                details: None,
            },
            other => other,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (limit, used) = match self {
            Self::UsageLimitExceeded { limit, used, .. } => (Some(*limit), Some(*used)),
            _ => (None, None),
        };

        ErrorResponse {
            error: self.to_string(),
            details: self.details().filter(|d| !d.is_empty()),
            limit,
            used,
        }
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                details = ?self.details(),
                status = %status.as_u16(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = %status.as_u16(),
                "Request rejected"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
