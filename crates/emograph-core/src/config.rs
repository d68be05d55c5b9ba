//! Configuration
//!
//! - [`EngineConfig`]: fan-out width, retry budget, backoff, deadline
//! - [`SystemConfig`]: application file (`system.yml`) with UI labels and an
//!   optional `generation` section
//! - [`load_prompt`]: prompt file `{ prompt: { role, content } }`

use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use crate::transcript::{Message, Role};
use emograph_blueprint::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Generation engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Concurrent candidates per turn
    pub candidate_count: usize,
    /// Attempts per candidate, including the first
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` is followed by `n * base_delay_ms`
    pub base_delay_ms: u64,
    /// Deadline for a whole fan-out, if any
    pub turn_timeout_ms: Option<u64>,
    /// Arrow endpoint tolerance in pixels
    pub arrow_slack: u32,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With candidate count
    #[inline]
    #[must_use]
    pub fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = count;
        self
    }

    /// With attempts per candidate
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// With backoff unit
    #[inline]
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With whole-fan-out deadline
    #[inline]
    #[must_use]
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Retry policy derived from this config
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    /// Validation options derived from this config
    #[must_use]
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            arrow_slack: self.arrow_slack,
        }
    }

    /// Deadline for a whole fan-out
    #[must_use]
    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_ms.map(Duration::from_millis)
    }

    /// Check values are usable
    ///
    /// # Errors
    /// `ConfigError::Invalid` for a zero candidate count, zero attempts, or a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidate_count == 0 {
            return Err(ConfigError::Invalid("candidate_count must be > 0".into()));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be > 0".into()));
        }
        if self.turn_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid("turn_timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candidate_count: 3,
            max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 1000,
            turn_timeout_ms: None,
            arrow_slack: ValidationOptions::default().arrow_slack,
        }
    }
}

/// UI labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    pub title: String,
    #[serde(default)]
    pub subheader: String,
}

/// Application configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub title: String,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub generation: EngineConfig,
}

impl SystemConfig {
    /// Parse from YAML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed YAML, `ConfigError::Invalid` on bad values.
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.generation.validate()?;
        Ok(config)
    }
}

/// Load the application configuration file
///
/// # Errors
/// IO, parse, or validation failure.
pub fn load_system_config(path: impl AsRef<Path>) -> Result<SystemConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
    SystemConfig::from_yaml_str(&text, path)
}

#[derive(Debug, Deserialize)]
struct PromptFile {
    prompt: PromptEntry,
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    role: String,
    content: String,
}

/// Load a prompt file into a transcript message
///
/// # Errors
/// IO or parse failure, or `ConfigError::InvalidRole` for an unknown role.
pub fn load_prompt(path: impl AsRef<Path>) -> Result<Message, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
    let file: PromptFile = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let role: Role = file.prompt.role.parse().map_err(ConfigError::InvalidRole)?;
    Ok(Message::new(role, file.prompt.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_match_retry_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.candidate_count, 3);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.turn_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_candidates_rejected() {
        let config = EngineConfig::new().with_candidate_count(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn system_config_with_partial_generation() {
        let file = write_temp(
            "title: Emograph\nui:\n  title: 心的描画\n  subheader: draw ideas\ngeneration:\n  candidate_count: 5\n",
        );
        let config = load_system_config(file.path()).unwrap();
        assert_eq!(config.ui.title, "心的描画");
        assert_eq!(config.generation.candidate_count, 5);
        assert_eq!(config.generation.max_attempts, 3);
    }

    #[test]
    fn system_config_without_generation_uses_defaults() {
        let file = write_temp("title: Emograph\n");
        let config = load_system_config(file.path()).unwrap();
        assert_eq!(config.generation, EngineConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_system_config("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn prompt_loads_with_role() {
        let file = write_temp("prompt:\n  role: system\n  content: Draw the idea.\n");
        let message = load_prompt(file.path()).unwrap();
        assert_eq!(message, Message::system("Draw the idea."));
    }

    #[test]
    fn prompt_with_unknown_role() {
        let file = write_temp("prompt:\n  role: narrator\n  content: x\n");
        let err = load_prompt(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRole(role) if role == "narrator"));
    }

    #[test]
    fn malformed_prompt_is_parse_error() {
        let file = write_temp("prompt: [not, a, mapping]\n");
        assert!(matches!(
            load_prompt(file.path()).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }
}
