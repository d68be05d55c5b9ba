//! Concurrent multi-candidate generation
//!
//! [`FanOut`] runs `count` retrying generations against one transcript
//! snapshot and joins on all of them. A failing slot never cancels its
//! siblings; failures are dropped and the surviving candidates keep their
//! original slot order regardless of which finished first.

use crate::client::GenerationClient;
use crate::error::GenerationError;
use crate::retry::{Generated, RetryingGenerator};
use crate::transcript::Transcript;
use emograph_blueprint::{Blueprint, SchemaWarning};
use futures::future::join_all;
use tracing::Instrument;
use ulid::Ulid;

/// Identifier of one fan-out batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(pub Ulid);

impl BatchId {
    /// Generate new batch ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated blueprint offered for selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationCandidate {
    /// Batch this candidate came from
    pub batch: BatchId,
    /// Slot index within the batch (0-based)
    pub index: usize,
    pub response: String,
    pub blueprint: Blueprint,
    pub warnings: Vec<SchemaWarning>,
    pub attempts: u32,
}

impl GenerationCandidate {
    fn from_generated(batch: BatchId, index: usize, generated: Generated) -> Self {
        Self {
            batch,
            index,
            response: generated.response,
            blueprint: generated.blueprint,
            warnings: generated.warnings,
            attempts: generated.attempts,
        }
    }
}

/// Terminal state of one slot
#[derive(Debug, Clone)]
pub enum SlotOutcome {
    Succeeded(GenerationCandidate),
    Failed { index: usize, error: GenerationError },
}

impl SlotOutcome {
    /// Slot index
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Succeeded(candidate) => candidate.index,
            Self::Failed { index, .. } => *index,
        }
    }

    /// Check if slot produced a candidate
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// Every slot's outcome, indexed by slot
#[derive(Debug, Clone)]
pub struct FanOutReport {
    pub batch: BatchId,
    pub slots: Vec<SlotOutcome>,
}

impl FanOutReport {
    /// Number of slots requested
    #[inline]
    #[must_use]
    pub fn requested(&self) -> usize {
        self.slots.len()
    }

    /// Successful candidates in slot order
    pub fn candidates(&self) -> impl Iterator<Item = &GenerationCandidate> {
        self.slots.iter().filter_map(|slot| match slot {
            SlotOutcome::Succeeded(candidate) => Some(candidate),
            SlotOutcome::Failed { .. } => None,
        })
    }

    /// Failed slots with their terminal errors
    pub fn failures(&self) -> impl Iterator<Item = (usize, &GenerationError)> {
        self.slots.iter().filter_map(|slot| match slot {
            SlotOutcome::Failed { index, error } => Some((*index, error)),
            SlotOutcome::Succeeded(_) => None,
        })
    }

    /// Drop failures, keeping successes in slot order
    #[must_use]
    pub fn into_candidates(self) -> Vec<GenerationCandidate> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                SlotOutcome::Succeeded(candidate) => Some(candidate),
                SlotOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

/// Fan-out aggregator
#[derive(Debug, Clone)]
pub struct FanOut {
    generator: RetryingGenerator,
    count: usize,
}

impl FanOut {
    /// Default number of slots
    pub const DEFAULT_COUNT: usize = 3;

    /// Create aggregator
    #[inline]
    #[must_use]
    pub fn new(generator: RetryingGenerator, count: usize) -> Self {
        Self { generator, count }
    }

    /// Number of slots per batch
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Run every slot to a terminal state and report each outcome
    ///
    /// Slots run concurrently on the calling task and share only the
    /// read-only transcript. Dropping the returned future cancels all slots
    /// together.
    pub async fn run<C>(&self, client: &C, transcript: &Transcript) -> FanOutReport
    where
        C: GenerationClient + ?Sized,
    {
        let batch = BatchId::new();
        tracing::info!(%batch, count = self.count, messages = transcript.len(), "starting fan-out");

        let slots = (0..self.count).map(move |index| {
            let span = tracing::info_span!("slot", %batch, index);
            async move {
                match self.generator.invoke(client, transcript).await {
                    Ok(generated) => {
                        tracing::debug!(attempts = generated.attempts, "slot succeeded");
                        SlotOutcome::Succeeded(GenerationCandidate::from_generated(
                            batch, index, generated,
                        ))
                    }
                    Err(error) => SlotOutcome::Failed { index, error },
                }
            }
            .instrument(span)
        });

        // join_all yields outputs in input order, independent of completion order
        let slots = join_all(slots).await;

        let report = FanOutReport { batch, slots };
        let succeeded = report.candidates().count();
        tracing::info!(
            %batch,
            requested = report.requested(),
            succeeded,
            failed = report.requested() - succeeded,
            "fan-out finished"
        );
        report
    }

    /// Successful candidates only, in slot order; never fails
    ///
    /// An empty result means every slot failed.
    pub async fn generate_candidates<C>(
        &self,
        client: &C,
        transcript: &Transcript,
    ) -> Vec<GenerationCandidate>
    where
        C: GenerationClient + ?Sized,
    {
        self.run(client, transcript).await.into_candidates()
    }
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new(RetryingGenerator::default(), Self::DEFAULT_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenerationOutput;
    use crate::transcript::Message;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl GenerationClient for CountingClient {
        async fn generate(&self, _transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GenerationOutput::new(
                format!("reply {n}"),
                json!({"width": 4, "height": 4, "background_color": "white", "elements": []}),
            ))
        }
    }

    #[tokio::test]
    async fn every_slot_is_called_once() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
        };
        let transcript: Transcript = vec![Message::user("draw a cat")].into();

        let report = FanOut::default().run(&client, &transcript).await;

        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.requested(), 3);
        let indices: Vec<_> = report.candidates().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(report.candidates().all(|c| c.batch == report.batch));
    }

    #[tokio::test]
    async fn zero_slots_yield_empty_report() {
        let client = CountingClient {
            calls: AtomicUsize::new(0),
        };
        let transcript: Transcript = vec![Message::user("x")].into();
        let fan_out = FanOut::new(RetryingGenerator::default(), 0);

        assert!(fan_out.generate_candidates(&client, &transcript).await.is_empty());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }
}
