//! Single-request resilience
//!
//! [`RetryingGenerator`] wraps one client call in a bounded retry loop with
//! linear backoff. A reply only counts as a success once it validates; a
//! schema rejection is retried exactly like a transient client failure.

use crate::client::GenerationClient;
use crate::error::GenerationError;
use crate::transcript::Transcript;
use emograph_blueprint::{Blueprint, SchemaWarning, ValidationOptions};
use std::time::Duration;

/// Attempt budget and backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default base delay
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

    /// Create policy; a zero attempt budget is raised to one
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total attempts including the first
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base backoff unit
    #[inline]
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait before the attempt following `attempt` (1-based): `base_delay * attempt`
    #[inline]
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

/// Successful, validated generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub response: String,
    pub blueprint: Blueprint,
    pub warnings: Vec<SchemaWarning>,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Bounded retry around one generation request
#[derive(Debug, Clone, Default)]
pub struct RetryingGenerator {
    policy: RetryPolicy,
    options: ValidationOptions,
}

impl RetryingGenerator {
    /// Create generator
    #[inline]
    #[must_use]
    pub fn new(policy: RetryPolicy, options: ValidationOptions) -> Self {
        Self { policy, options }
    }

    /// Get retry policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Generate until a reply validates, attempts run out, or a permanent error occurs
    ///
    /// The only suspension points are the client call and the backoff sleep.
    /// No sleep follows the final attempt.
    ///
    /// # Errors
    /// - The permanent error, immediately, if the client reports one
    /// - Otherwise the last error seen once every attempt has failed
    pub async fn invoke<C>(&self, client: &C, transcript: &Transcript) -> Result<Generated, GenerationError>
    where
        C: GenerationClient + ?Sized,
    {
        let max = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            tracing::debug!(attempt, max, "requesting generation");

            let outcome = match client.generate(transcript).await {
                Ok(output) => output.validate(&self.options).map_err(GenerationError::from),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(document) => {
                    return Ok(Generated {
                        response: document.response,
                        blueprint: document.blueprint.blueprint,
                        warnings: document.blueprint.warnings,
                        attempts: attempt,
                    });
                }
                Err(err) if !err.is_retryable() => {
                    tracing::warn!(attempt, error = %err, "permanent failure, not retrying");
                    return Err(err);
                }
                Err(err) if attempt >= max => {
                    tracing::error!(attempts = attempt, error = %err, "generation attempts exhausted");
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "generation attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
