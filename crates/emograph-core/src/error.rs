//! Error types for Emograph Core
//!
//! Provides error handling for:
//! - Generation client failures (transient vs permanent)
//! - Rejected generator output
//! - Candidate selection misuse
//! - Configuration loading
//! - The caller-facing "no candidates" condition

use emograph_blueprint::SchemaError;
use std::path::PathBuf;

/// Failure of a single generation request
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// Network, timeout, or rate-limit class failure
    #[error("transient generation failure: {0}")]
    Transient(String),

    /// Authentication or invalid-request class failure
    #[error("permanent generation failure: {0}")]
    Permanent(String),

    /// The client answered but the document failed schema validation
    #[error("generator output rejected: {0}")]
    InvalidOutput(#[from] SchemaError),
}

impl GenerationError {
    /// Create transient error
    #[inline]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Create permanent error
    #[inline]
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Permanent(message.into())
    }

    /// Check if another attempt may succeed
    ///
    /// Everything except [`GenerationError::Permanent`] is retried, including
    /// schema rejections: a fresh generation is the only way to repair them.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Permanent(_))
    }
}

/// Misuse of the candidate selection state machine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// No candidate set is pending
    #[error("no candidates are awaiting selection")]
    NotAwaitingSelection,

    /// Candidates are already pending for this turn
    #[error("candidates already offered for this turn")]
    AlreadyAwaiting,

    /// Index past the end of the pending set
    #[error("candidate {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Candidates belong to a turn that newer input has superseded
    #[error("turn {offered} was superseded by turn {current}")]
    StaleTurn { offered: u64, current: u64 },

    /// A candidate was already selected for this turn
    #[error("turn {turn} already has a selection")]
    TurnResolved { turn: u64 },

    /// An empty candidate set cannot be offered
    #[error("cannot offer an empty candidate set")]
    EmptyCandidateSet,

    /// The selected blueprint could not be serialized for history
    #[error("failed to serialize selected blueprint: {0}")]
    Serialization(String),

    /// The rendering collaborator failed
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// Failure reported by a [`crate::Renderer`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML could not be parsed into the expected shape
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Prompt role is not one of system / user / assistant
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Value out of its permitted range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Caller-facing engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Every fan-out slot failed
    #[error("no candidates generated out of {requested} requested, please retry")]
    NoCandidates { requested: usize },

    /// The whole fan-out exceeded its deadline and was cancelled
    #[error("generation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Selection state misuse
    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Check if the user should simply try again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoCandidates { .. } | Self::Timeout { .. })
    }
}
