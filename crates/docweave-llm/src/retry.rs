//! Retry with exponential backoff around any `ILanguageModel`.

use std::thread;
use std::time::Duration;

use docweave_core::config::LlmSettings;
use docweave_core::errors::LlmError;
use docweave_core::models::{ChatRequest, ChatResponse};
use docweave_core::traits::{Cancellable, CancellationToken, ILanguageModel};
use tracing::{debug, warn};

const BACKOFF_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: settings.initial_backoff,
            max_backoff: settings.max_backoff,
        }
    }

    /// No retries, for callers that handle failure themselves.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based), capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = BACKOFF_MULTIPLIER.saturating_pow(attempt);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Wraps a model so every call checks cancellation first and retries
/// transient failures. Non-retryable errors surface immediately.
pub struct RetryingModel<M> {
    inner: M,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<M: ILanguageModel> RetryingModel<M> {
    pub fn new(inner: M, policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self {
            inner,
            policy,
            cancel,
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Sleep in short slices so cancellation interrupts a long backoff.
    fn wait(&self, delay: Duration) -> Result<(), LlmError> {
        const SLICE: Duration = Duration::from_millis(50);
        let mut left = delay;
        while !left.is_zero() {
            if self.cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }
            let step = left.min(SLICE);
            thread::sleep(step);
            left -= step;
        }
        Ok(())
    }
}

impl<M: ILanguageModel> ILanguageModel for RetryingModel<M> {
    fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let attempts = self.policy.max_retries + 1;
        let mut attempt = 0;
        loop {
            if self.cancel.is_cancelled() {
                return Err(LlmError::Cancelled);
            }
            match self.inner.complete(request) {
                Ok(response) => {
                    if attempt > 0 {
                        debug!(attempt = attempt + 1, "model call succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt + 1 >= attempts => {
                    return Err(LlmError::RetriesExhausted {
                        attempts,
                        last_error: e.to_string(),
                    })
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        of = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "model call failed, retrying"
                    );
                    self.wait(delay)?;
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
