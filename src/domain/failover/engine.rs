use super::state::{FailoverEvent, FailoverState, RetryPolicy};
use crate::infrastructure::providers::{Provider, ProviderError, ProviderErrorKind};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(ProviderErrorKind),
}

/// One provider invocation, as observed by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub provider: String,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    /// Delay scheduled before the next attempt on the same provider
    pub backoff: Option<Duration>,
}

#[derive(Debug)]
pub struct FailoverSuccess<T> {
    pub value: T,
    pub provider: String,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum FailoverError {
    #[error("no provider configured")]
    NoProviders,

    #[error("all providers failed")]
    Exhausted {
        last_error: Option<ProviderError>,
        attempts: Vec<AttemptRecord>,
    },

    #[error("request rejected by {provider}: {error}")]
    Aborted {
        provider: String,
        error: ProviderError,
        attempts: Vec<AttemptRecord>,
    },
}

/// Walks an ordered provider list following [`FailoverState`] transitions.
#[derive(Debug, Clone)]
pub struct FailoverEngine {
    policy: RetryPolicy,
}

impl FailoverEngine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Drive the chain until a provider succeeds or the chain ends.
    ///
    /// `invoke` performs one attempt against the given provider. Backoff waits
    /// suspend only the calling task.
    pub async fn run<P, T, F, Fut>(
        &self,
        providers: &[Arc<P>],
        mut invoke: F,
    ) -> Result<FailoverSuccess<T>, FailoverError>
    where
        P: Provider + ?Sized,
        F: FnMut(Arc<P>) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        if providers.is_empty() {
            return Err(FailoverError::NoProviders);
        }

        let count = providers.len();
        let mut state = FailoverState::Idle;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_error: Option<ProviderError> = None;

        loop {
            state = match state {
                FailoverState::Idle => state.transition(FailoverEvent::Start, &self.policy, count),

                FailoverState::Attempting { provider, attempt } => {
                    let target = &providers[provider];
                    let name = target.name().to_string();

                    match invoke(Arc::clone(target)).await {
                        Ok(value) => {
                            tracing::info!(provider = %name, attempt, "Provider call succeeded");
                            attempts.push(AttemptRecord {
                                provider: name.clone(),
                                attempt,
                                outcome: AttemptOutcome::Succeeded,
                                backoff: None,
                            });
                            return Ok(FailoverSuccess {
                                value,
                                provider: name,
                                attempts,
                            });
                        }
                        Err(error) => {
                            let next =
                                state.transition(FailoverEvent::Failure(&error), &self.policy, count);
                            let backoff = match next {
                                FailoverState::Backoff { delay, .. } => Some(delay),
                                _ => None,
                            };

                            tracing::warn!(
                                provider = %name,
                                attempt,
                                kind = %error.kind,
                                error = %error.message,
                                backoff_ms = backoff.map(|d| d.as_millis() as u64),
                                "Provider call failed"
                            );

                            attempts.push(AttemptRecord {
                                provider: name.clone(),
                                attempt,
                                outcome: AttemptOutcome::Failed(error.kind),
                                backoff,
                            });

                            if let FailoverState::Aborted { .. } = next {
                                return Err(FailoverError::Aborted {
                                    provider: name,
                                    error,
                                    attempts,
                                });
                            }

                            last_error = Some(error);
                            next
                        }
                    }
                }

                FailoverState::Backoff { delay, .. } => {
                    tokio::time::sleep(delay).await;
                    state.transition(FailoverEvent::Resume, &self.policy, count)
                }

                FailoverState::FailoverNext { provider } => {
                    let next = state.transition(FailoverEvent::Resume, &self.policy, count);
                    if let FailoverState::Attempting { provider: to, .. } = next {
                        tracing::info!(
                            from = %providers[provider].name(),
                            to = %providers[to].name(),
                            "Failing over to next provider"
                        );
                    }
                    next
                }

                FailoverState::Exhausted
                | FailoverState::Succeeded { .. }
                | FailoverState::Aborted { .. } => break,
            };
        }

        tracing::warn!(attempt_count = attempts.len(), "Provider chain exhausted");
        Err(FailoverError::Exhausted {
            last_error,
            attempts,
        })
    }
}
