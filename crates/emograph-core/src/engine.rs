//! Turn processing
//!
//! [`Engine`] ties a generation client to the fan-out and the caller's
//! [`Session`]:
//! 1. Record the user input (discarding any pending candidates)
//! 2. Fan out against the resulting transcript snapshot
//! 3. Offer the successes for selection, or report that none exist

use crate::client::GenerationClient;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fanout::{FanOut, FanOutReport, GenerationCandidate};
use crate::retry::RetryingGenerator;
use crate::session::Session;
use crate::transcript::Transcript;

/// Generation engine
#[derive(Debug)]
pub struct Engine<C> {
    client: C,
    config: EngineConfig,
    fan_out: FanOut,
}

impl<C: GenerationClient> Engine<C> {
    /// Create engine
    ///
    /// # Errors
    /// `EngineError::Config` if `config` fails validation.
    pub fn new(client: C, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let generator = RetryingGenerator::new(config.retry_policy(), config.validation_options());
        let fan_out = FanOut::new(generator, config.candidate_count);
        Ok(Self {
            client,
            config,
            fan_out,
        })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get generation client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fan out for a transcript, honoring the configured deadline
    ///
    /// On timeout every slot is cancelled together and no partial report is
    /// returned.
    ///
    /// # Errors
    /// `EngineError::Timeout` if the deadline passes.
    pub async fn report(&self, transcript: &Transcript) -> Result<FanOutReport, EngineError> {
        let run = self.fan_out.run(&self.client, transcript);
        match self.config.turn_timeout() {
            Some(deadline) => tokio::time::timeout(deadline, run).await.map_err(|_| {
                tracing::warn!(timeout_ms = ?self.config.turn_timeout_ms, "fan-out cancelled");
                EngineError::Timeout {
                    duration_ms: self.config.turn_timeout_ms.unwrap_or_default(),
                }
            }),
            None => Ok(run.await),
        }
    }

    /// Successful candidates for a transcript
    ///
    /// # Errors
    /// - `EngineError::NoCandidates` if every slot failed
    /// - `EngineError::Timeout` if the deadline passes
    pub async fn generate(
        &self,
        transcript: &Transcript,
    ) -> Result<Vec<GenerationCandidate>, EngineError> {
        let report = self.report(transcript).await?;
        let requested = report.requested();
        for (index, error) in report.failures() {
            tracing::debug!(index, %error, "slot dropped");
        }

        let candidates = report.into_candidates();
        if candidates.is_empty() {
            tracing::error!(requested, "every fan-out slot failed");
            return Err(EngineError::NoCandidates { requested });
        }
        Ok(candidates)
    }

    /// Process one user input end to end
    ///
    /// Holding `&mut Session` across the fan-out keeps the selection state
    /// single-writer for the whole turn.
    ///
    /// # Errors
    /// - `EngineError::NoCandidates` if every slot failed; the session is `Idle`
    /// - `EngineError::Timeout` if the deadline passes; the session is `Idle`
    pub async fn process_turn<'s>(
        &self,
        session: &'s mut Session,
        input: impl Into<String>,
    ) -> Result<&'s [GenerationCandidate], EngineError> {
        let input = input.into();
        tracing::info!(chars = input.chars().count(), "processing turn");

        let (token, transcript) = session.begin_turn(input);
        let candidates = self.generate(&transcript).await?;
        Ok(session.offer(token, candidates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenerationOutput;
    use crate::error::GenerationError;

    struct Unreachable;

    #[async_trait::async_trait]
    impl GenerationClient for Unreachable {
        async fn generate(&self, _transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
            Err(GenerationError::permanent("offline"))
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = Engine::new(Unreachable, EngineConfig::new().with_candidate_count(0));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[tokio::test]
    async fn all_permanent_failures_yield_no_candidates() {
        let engine = Engine::new(Unreachable, EngineConfig::default()).unwrap();
        let mut session = Session::new();

        let err = engine.process_turn(&mut session, "idea").await.unwrap_err();

        assert!(matches!(err, EngineError::NoCandidates { requested: 3 }));
        assert!(!session.state().is_awaiting());
        assert_eq!(session.history().len(), 1);
    }
}
