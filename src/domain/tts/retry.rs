use super::error::{ErrorCategory, TransportError, TtsServiceError};
use super::sleeper::Sleeper;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Minimum wait after a rate-limit signal
pub const RATE_LIMIT_MIN_WAIT: Duration = Duration::from_millis(5000);
/// Fixed wait after a transport-level failure
pub const NETWORK_WAIT: Duration = Duration::from_millis(5000);
/// Growth of the base delay after every retry
pub const BACKOFF_FACTOR: f64 = 1.5;

/// Next base delay, saturating at `Duration::MAX`
fn grow(delay: Duration) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * BACKOFF_FACTOR).unwrap_or(Duration::MAX)
}

/// Lifecycle of a single retried operation
#[derive(Debug)]
enum RetryState<T> {
    Attempting {
        attempt: u32,
        retries_left: u32,
        delay: Duration,
    },
    BackingOff {
        attempt: u32,
        retries_left: u32,
        delay: Duration,
        category: ErrorCategory,
        error: TransportError,
    },
    Succeeded(T),
    FailedFatal(TransportError),
    FailedExhausted {
        attempts: u32,
        category: ErrorCategory,
        error: TransportError,
    },
}

/// Retries an operation against the speech endpoint with classified backoff
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            max_retries,
            base_delay,
            sleeper,
        }
    }

    /// How long to wait before retrying after a failure of `category`
    pub fn wait_for(category: ErrorCategory, delay: Duration) -> Duration {
        match category {
            ErrorCategory::RateLimited => delay.max(RATE_LIMIT_MIN_WAIT),
            ErrorCategory::NetworkTransient => NETWORK_WAIT,
            _ => delay,
        }
    }

    /// Run `operation` until it succeeds, fails fatally or runs out of retries.
    ///
    /// At most `max_retries + 1` attempts are made. Exhaustion keeps the last
    /// error and its category.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, TtsServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut state = RetryState::Attempting {
            attempt: 1,
            retries_left: self.max_retries,
            delay: self.base_delay,
        };
        let mut total_wait = Duration::ZERO;

        loop {
            state = match state {
                RetryState::Attempting {
                    attempt,
                    retries_left,
                    delay,
                } => {
                    tracing::debug!(attempt = attempt, retries_left = retries_left, "Attempting speech request");

                    match operation().await {
                        Ok(value) => RetryState::Succeeded(value),
                        Err(error) => {
                            let category = ErrorCategory::classify(&error);
                            tracing::warn!(
                                attempt = attempt,
                                category = %category,
                                status = ?error.status,
                                code = ?error.code,
                                error = %error,
                                "Speech request failed"
                            );

                            if !category.is_retryable() {
                                RetryState::FailedFatal(error)
                            } else if retries_left == 0 {
                                RetryState::FailedExhausted {
                                    attempts: attempt,
                                    category,
                                    error,
                                }
                            } else {
                                RetryState::BackingOff {
                                    attempt,
                                    retries_left,
                                    delay,
                                    category,
                                    error,
                                }
                            }
                        }
                    }
                }
                RetryState::BackingOff {
                    attempt,
                    retries_left,
                    delay,
                    category,
                    error,
                } => {
                    let wait = Self::wait_for(category, delay);
                    tracing::info!(
                        attempt = attempt,
                        category = %category,
                        wait_ms = wait.as_millis() as u64,
                        last_error = %error,
                        "Backing off before retry"
                    );

                    self.sleeper.sleep(wait).await;
                    total_wait = total_wait.saturating_add(wait);

                    RetryState::Attempting {
                        attempt: attempt + 1,
                        retries_left: retries_left - 1,
                        delay: grow(delay),
                    }
                }
                RetryState::Succeeded(value) => {
                    if total_wait > Duration::ZERO {
                        tracing::info!(
                            total_wait_ms = total_wait.as_millis() as u64,
                            "Speech request recovered after retries"
                        );
                    }
                    return Ok(value);
                }
                RetryState::FailedFatal(error) => {
                    return Err(TtsServiceError::UpstreamFatal(error));
                }
                RetryState::FailedExhausted {
                    attempts,
                    category,
                    error,
                } => {
                    tracing::error!(
                        attempts = attempts,
                        category = %category,
                        total_wait_ms = total_wait.as_millis() as u64,
                        error = %error,
                        "Speech request retries exhausted"
                    );
                    return Err(TtsServiceError::RetriesExhausted {
                        attempts,
                        category,
                        source: error,
                    });
                }
            };
        }
    }
}
