use crate::infrastructure::providers::{ProviderError, ProviderErrorKind};
use std::time::Duration;

/// How many times a provider is tried and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per provider, including the first (`R`)
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound for both computed and vendor-supplied delays
    pub max_delay: Duration,
    /// Stop the whole chain on `InvalidRequest` instead of moving on
    pub abort_on_invalid_request: bool,
}

impl RetryPolicy {
    /// Chat: bounded exponential backoff on transient failures
    pub fn chat(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(30),
            abort_on_invalid_request: true,
        }
    }

    /// Images: one attempt per provider, pure ordered fallthrough
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            abort_on_invalid_request: false,
        }
    }

    /// `base_delay × 2^(attempt-1)`, or the vendor's hint when it sent one
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let exponent = attempt.saturating_sub(1).min(16);
            self.base_delay.saturating_mul(1u32 << exponent)
        });
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::chat(3, Duration::from_secs(1))
    }
}

/// Per-request position in the provider chain. `provider` is an index into the
/// ordered provider list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailoverState {
    Idle,
    Attempting { provider: usize, attempt: u32 },
    Backoff { provider: usize, attempt: u32, delay: Duration },
    FailoverNext { provider: usize },
    Succeeded { provider: usize },
    /// The request itself was rejected; no other provider will accept it either
    Aborted { provider: usize },
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
pub enum FailoverEvent<'a> {
    Start,
    Success,
    Failure(&'a ProviderError),
    /// Backoff elapsed, or failover acknowledged
    Resume,
}

impl FailoverState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded { .. } | Self::Aborted { .. } | Self::Exhausted
        )
    }

    /// Apply one event. Events that make no sense in the current state leave it unchanged.
    pub fn transition(
        self,
        event: FailoverEvent<'_>,
        policy: &RetryPolicy,
        provider_count: usize,
    ) -> Self {
        match (self, event) {
            (Self::Idle, FailoverEvent::Start) => Self::first_attempt(0, provider_count),

            (Self::Attempting { provider, .. }, FailoverEvent::Success) => {
                Self::Succeeded { provider }
            }

            (Self::Attempting { provider, attempt }, FailoverEvent::Failure(error)) => {
                match error.kind {
                    ProviderErrorKind::QuotaExceeded | ProviderErrorKind::Auth => {
                        Self::FailoverNext { provider }
                    }
                    ProviderErrorKind::InvalidRequest if policy.abort_on_invalid_request => {
                        Self::Aborted { provider }
                    }
                    ProviderErrorKind::InvalidRequest => Self::FailoverNext { provider },
                    kind if kind.is_transient() && attempt < policy.max_attempts => {
                        Self::Backoff {
                            provider,
                            attempt,
                            delay: policy.backoff_delay(attempt, error.retry_after),
                        }
                    }
                    _ => Self::FailoverNext { provider },
                }
            }

            (Self::Backoff { provider, attempt, .. }, FailoverEvent::Resume) => Self::Attempting {
                provider,
                attempt: attempt + 1,
            },

            (Self::FailoverNext { provider }, FailoverEvent::Resume) => {
                Self::first_attempt(provider + 1, provider_count)
            }

            (state, _) => state,
        }
    }

    fn first_attempt(provider: usize, provider_count: usize) -> Self {
        if provider < provider_count {
            Self::Attempting {
                provider,
                attempt: 1,
            }
        } else {
            Self::Exhausted
        }
    }
}
