//! Generation client boundary
//!
//! The engine never talks to a model directly. It calls a
//! [`GenerationClient`], which turns a transcript into a reply and a raw
//! blueprint document, and validates whatever comes back itself.

use crate::error::GenerationError;
use crate::transcript::Transcript;
use emograph_blueprint::{validate_with, OutputDocument, SchemaError, ValidationOptions};
use serde_json::Value;
use std::sync::Arc;

/// Unvalidated client answer
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    /// Reply text and blueprint document supplied separately
    Split { response: String, document: Value },
    /// A single `{ response, emograph_blueprint }` document
    Combined(Value),
}

impl GenerationOutput {
    /// Split answer
    #[inline]
    pub fn new(response: impl Into<String>, document: Value) -> Self {
        Self::Split {
            response: response.into(),
            document,
        }
    }

    /// Combined answer
    #[inline]
    #[must_use]
    pub fn combined(document: Value) -> Self {
        Self::Combined(document)
    }

    /// Validate into a typed output
    ///
    /// # Errors
    /// Returns the first [`SchemaError`] found.
    pub fn validate(&self, options: &ValidationOptions) -> Result<OutputDocument, SchemaError> {
        match self {
            Self::Split { response, document } => Ok(OutputDocument {
                response: response.clone(),
                blueprint: validate_with(document, options)?,
            }),
            Self::Combined(document) => OutputDocument::from_value(document, options),
        }
    }
}

/// Capability to generate one reply for a transcript
///
/// Implementations mark failures that must not be retried as
/// [`GenerationError::Permanent`]; anything else is retried with backoff.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a reply for the transcript
    async fn generate(&self, transcript: &Transcript) -> Result<GenerationOutput, GenerationError>;
}

#[async_trait::async_trait]
impl<C: GenerationClient + ?Sized> GenerationClient for Arc<C> {
    async fn generate(&self, transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
        (**self).generate(transcript).await
    }
}

#[async_trait::async_trait]
impl<C: GenerationClient + ?Sized> GenerationClient for Box<C> {
    async fn generate(&self, transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
        (**self).generate(transcript).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emograph_blueprint::SchemaErrorKind;
    use serde_json::json;

    fn blueprint() -> Value {
        json!({"width": 8, "height": 8, "background_color": "white", "elements": []})
    }

    #[test]
    fn split_output_validates() {
        let out = GenerationOutput::new("ok", blueprint())
            .validate(&ValidationOptions::default())
            .unwrap();
        assert_eq!(out.response, "ok");
    }

    #[test]
    fn combined_output_validates() {
        let doc = json!({"response": "ok", "emograph_blueprint": blueprint()});
        let out = GenerationOutput::combined(doc)
            .validate(&ValidationOptions::default())
            .unwrap();
        assert_eq!(out.blueprint.blueprint.height, 8);
    }

    #[test]
    fn invalid_split_document() {
        let err = GenerationOutput::new("ok", json!({"width": 8}))
            .validate(&ValidationOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, SchemaErrorKind::MissingField);
    }
}
