use super::error::{TransportError, TtsServiceError};
use super::model::{Sequenced, SynthesisResult};
use super::retry::RetryPolicy;
use super::sleeper::Sleeper;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs remote operations one at a time with a fixed delay between them.
///
/// Nothing here runs concurrently: the upstream enforces aggregate rate
/// limits, so every item waits for the previous one to settle.
#[derive(Clone)]
pub struct ThrottledSequencer {
    retry: RetryPolicy,
    inter_item_delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl ThrottledSequencer {
    pub fn new(retry: RetryPolicy, inter_item_delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            retry,
            inter_item_delay,
            sleeper,
        }
    }

    /// Run `action` for every item in order, each call wrapped in the retry policy.
    ///
    /// With `fail_fast` the first unrecoverable failure aborts the remaining
    /// items and is returned. Without it the failed item is recorded with no
    /// buffer and the run continues.
    pub async fn run_sequential<I, F, Fut>(
        &self,
        items: &[I],
        mut action: F,
        fail_fast: bool,
    ) -> Result<Vec<SynthesisResult>, TtsServiceError>
    where
        I: Sequenced,
        F: FnMut(&I) -> Fut,
        Fut: Future<Output = Result<Vec<u8>, TransportError>>,
    {
        let mut results = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let ordinal = item.ordinal();

            if index > 0 && !self.inter_item_delay.is_zero() {
                tracing::debug!(
                    ordinal = ordinal,
                    delay_ms = self.inter_item_delay.as_millis() as u64,
                    "Throttling before next request"
                );
                self.sleeper.sleep(self.inter_item_delay).await;
            }

            tracing::info!(
                ordinal = ordinal,
                position = index + 1,
                total = items.len(),
                "Synthesizing unit"
            );

            match self.retry.execute(|| action(item)).await {
                Ok(buffer) => {
                    tracing::debug!(
                        ordinal = ordinal,
                        audio_size = buffer.len(),
                        "Unit synthesized"
                    );
                    results.push(SynthesisResult {
                        ordinal,
                        buffer: Some(buffer),
                    });
                }
                Err(err) if fail_fast => {
                    tracing::error!(
                        ordinal = ordinal,
                        remaining = items.len() - index - 1,
                        error = %err,
                        "Unit failed, aborting sequence"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        ordinal = ordinal,
                        error = %err,
                        "Unit failed, skipping"
                    );
                    results.push(SynthesisResult {
                        ordinal,
                        buffer: None,
                    });
                }
            }
        }

        Ok(results)
    }
}
