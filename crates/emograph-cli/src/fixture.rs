//! Recorded generator output
//!
//! [`FixtureClient`] stands in for a language model: it replays structured
//! output documents from a YAML file, one per call, cycling through them.
//! Documents are validated by the engine like any live reply.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use emograph_core::{GenerationClient, GenerationError, GenerationOutput, Transcript};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin client over recorded output documents
#[derive(Debug)]
pub struct FixtureClient {
    documents: Vec<Value>,
    next: AtomicUsize,
}

impl FixtureClient {
    /// Create client from documents
    ///
    /// # Errors
    /// Fails if `documents` is empty.
    pub fn new(documents: Vec<Value>) -> Result<Self> {
        if documents.is_empty() {
            bail!("fixture set is empty");
        }
        Ok(Self {
            documents,
            next: AtomicUsize::new(0),
        })
    }

    /// Parse a YAML sequence of documents
    ///
    /// # Errors
    /// Fails on malformed YAML, a non-sequence root, or an empty list.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text).context("fixture file is not valid YAML")?;
        let Value::Array(documents) = root else {
            bail!("fixture file must be a YAML list of output documents");
        };
        Self::new(documents)
    }

    /// Load fixtures from a file
    ///
    /// # Errors
    /// IO or parse failure.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid fixtures {}", path.display()))
    }

    /// Number of recorded documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false; construction rejects empty sets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl GenerationClient for FixtureClient {
    async fn generate(&self, transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
        let call = self.next.fetch_add(1, Ordering::Relaxed);
        let index = call % self.documents.len();
        tracing::debug!(call, fixture = index, messages = transcript.len(), "serving fixture");
        Ok(GenerationOutput::combined(self.documents[index].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emograph_core::Message;

    #[tokio::test]
    async fn cycles_through_documents() {
        let client = FixtureClient::from_yaml("- {response: a}\n- {response: b}\n").unwrap();
        let transcript: Transcript = vec![Message::user("x")].into();

        let mut seen = Vec::new();
        for _ in 0..3 {
            match client.generate(&transcript).await.unwrap() {
                GenerationOutput::Combined(doc) => seen.push(doc["response"].clone()),
                GenerationOutput::Split { .. } => unreachable!(),
            }
        }
        assert_eq!(seen, vec!["a", "b", "a"]);
    }

    #[test]
    fn empty_list_rejected() {
        assert!(FixtureClient::from_yaml("[]").is_err());
    }

    #[test]
    fn mapping_root_rejected() {
        assert!(FixtureClient::from_yaml("response: a").is_err());
    }
}
