use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Longest slice of a vendor error body kept for diagnostics
const MAX_VENDOR_MESSAGE_LEN: usize = 300;

/// The five failure kinds every provider adapter reduces vendor errors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Bad or missing vendor credential
    Auth,
    /// Vendor billing or usage cap; persistent for the lifetime of a request
    QuotaExceeded,
    /// Vendor throttling
    RateLimited,
    /// Vendor 5xx, timeouts, connection failures
    ServiceUnavailable,
    /// Malformed payload rejected by the vendor
    InvalidRequest,
}

impl ProviderErrorKind {
    /// Whether retrying the same provider can succeed
    pub fn is_transient(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServiceUnavailable)
    }

    /// Stable, user-facing text for this kind
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Auth => {
                "AI provider authentication failed. Please check the configured API keys."
            }
            Self::QuotaExceeded => {
                "Quota exceeded: the AI provider account has reached its usage limit. Please check billing and usage with the provider."
            }
            Self::RateLimited => {
                "Rate limit exceeded: too many requests. Please wait a moment and try again."
            }
            Self::ServiceUnavailable => {
                "The AI service is currently unavailable. Please try again in a few moments."
            }
            Self::InvalidRequest => "Invalid request: please check your message and try again.",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "auth_error"),
            Self::QuotaExceeded => write!(f, "quota_exceeded"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}

/// A classified provider failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    /// Vendor-supplied retry hint (`Retry-After`, model loading estimate)
    pub retry_after: Option<Duration>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: truncate(message.into()),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        Self::new(classify_status(status, body), body)
    }

    /// Classify a transport-level failure (connect, timeout, body decode)
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::new(classify_status(status.as_u16(), ""), err.to_string());
        }
        if err.is_builder() {
            return Self::new(ProviderErrorKind::InvalidRequest, err.to_string());
        }
        Self::new(ProviderErrorKind::ServiceUnavailable, err.to_string())
    }
}

/// Map a vendor status code and error body to a failure kind.
///
/// A 429 is only a quota problem when the vendor says so; plain 429s are throttling.
pub fn classify_status(status: u16, body: &str) -> ProviderErrorKind {
    match status {
        401 | 403 => ProviderErrorKind::Auth,
        402 => ProviderErrorKind::QuotaExceeded,
        429 if mentions_quota(body) => ProviderErrorKind::QuotaExceeded,
        429 => ProviderErrorKind::RateLimited,
        408 | 500..=599 => ProviderErrorKind::ServiceUnavailable,
        400..=499 => ProviderErrorKind::InvalidRequest,
        _ => ProviderErrorKind::ServiceUnavailable,
    }
}

/// Whether a vendor error text describes billing or quota exhaustion
pub fn mentions_quota(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("quota") || lower.contains("billing") || lower.contains("insufficient_")
}

/// Parse a `Retry-After` header given in seconds
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_VENDOR_MESSAGE_LEN {
        let mut end = MAX_VENDOR_MESSAGE_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
        message.push_str("...");
    }
    message
}
