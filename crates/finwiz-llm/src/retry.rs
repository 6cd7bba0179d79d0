//! Exponential-backoff retries around language-model calls
//!
//! A call is retried when the provider returns an error or when it answers
//! with a completion that carries neither text nor tool calls. The delay after
//! failed attempt `n` (counting from zero) is
//! `min(max_delay, min_delay * backoff_factor^n)`; the last attempt is never
//! followed by a delay. Once the attempts are used up the last error is
//! returned unchanged.
//!
//! The async and blocking runners share [`RetryPolicy::assess`], so both
//! make the same decision for the same sequence of outcomes.

use crate::{
    BlockingLLMProvider, CompletionRequest, CompletionResponse, LLMError, LLMProvider, Result,
};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

const OPERATION: &str = "llm.complete";

/// A model output that may be structurally present but empty.
pub trait Generation {
    /// True when the payload has no usable content
    fn is_blank(&self) -> bool;
}

impl Generation for CompletionResponse {
    fn is_blank(&self) -> bool {
        CompletionResponse::is_blank(self)
    }
}

impl Generation for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first (at least 1)
    pub max_retries: u32,

    /// Delay after the first failed attempt
    pub min_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Growth factor between consecutive delays
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_factor: 2.0,
        }
    }
}

/// Outcome of one attempt
#[derive(Debug)]
enum RetryState<T> {
    Succeeded(T),
    Retrying { delay: Duration },
    Exhausted(LLMError),
}

impl RetryPolicy {
    /// Default delays with a custom attempt bound
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set the first delay
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff factor
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Number of attempts actually made; a bound of 0 still makes one call
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay that follows failed attempt `attempt` (zero-based).
    ///
    /// Factors below 1 are treated as 1 so the schedule never shrinks.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.min_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.backoff_factor.max(1.0);
        let scaled = self.min_delay.as_secs_f64() * factor.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }

    /// Every delay a permanently failing call would sleep through
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.attempts() - 1).map(|n| self.delay_for(n)).collect()
    }

    fn assess<T: Generation>(
        &self,
        operation: &str,
        attempt: u32,
        outcome: Result<T>,
    ) -> RetryState<T> {
        let err = match outcome {
            Ok(value) if !value.is_blank() => {
                if attempt > 0 {
                    debug!(operation, attempts = attempt + 1, "LLM call succeeded after retry");
                }
                return RetryState::Succeeded(value);
            }
            Ok(_) => LLMError::EmptyResponse,
            Err(err) => err,
        };

        let max_retries = self.attempts();
        if attempt + 1 >= max_retries {
            error!(
                operation,
                attempts = max_retries,
                error = %err,
                "All LLM call attempts failed"
            );
            return RetryState::Exhausted(err);
        }

        let delay = self.delay_for(attempt);
        warn!(
            operation,
            attempt = attempt + 1,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "LLM call failed, retrying"
        );
        RetryState::Retrying { delay }
    }

    /// Run `call` until it yields a non-blank value or the attempts run out.
    pub async fn run_async<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        T: Generation,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match self.assess(operation, attempt, call().await) {
                RetryState::Succeeded(value) => return Ok(value),
                RetryState::Exhausted(err) => return Err(err),
                RetryState::Retrying { delay } => {
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Blocking counterpart of [`RetryPolicy::run_async`]
    pub fn run_blocking<T, F>(&self, operation: &str, mut call: F) -> Result<T>
    where
        T: Generation,
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            match self.assess(operation, attempt, call()) {
                RetryState::Succeeded(value) => return Ok(value),
                RetryState::Exhausted(err) => return Err(err),
                RetryState::Retrying { delay } => {
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// Provider wrapper that applies a [`RetryPolicy`] to every completion.
///
/// Implements [`LLMProvider`] when the inner provider does, and
/// [`BlockingLLMProvider`] when the inner provider does.
#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: LLMProvider> LLMProvider for RetryingProvider<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.policy
            .run_async(OPERATION, || self.inner.complete(request.clone()))
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<P: BlockingLLMProvider> BlockingLLMProvider for RetryingProvider<P> {
    fn complete_blocking(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.policy
            .run_blocking(OPERATION, || self.inner.complete_blocking(request.clone()))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
