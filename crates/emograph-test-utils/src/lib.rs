//! Testing utilities for Emograph workspace
//!
//! Shared generation clients, fixtures, and setup helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use emograph_core::{
    Engine, EngineConfig, GenerationClient, GenerationError, GenerationOutput, Message, Transcript,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted client does for one call
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub result: Result<GenerationOutput, GenerationError>,
}

impl Step {
    pub fn ok(output: GenerationOutput) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(output),
        }
    }

    pub fn transient(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(GenerationError::transient(message)),
        }
    }

    pub fn permanent(message: &str) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(GenerationError::permanent(message)),
        }
    }

    /// Answer only after `delay` of (virtual) time
    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(usize) -> Step + Send + Sync>;

/// Generation client driven by the 0-based call number
///
/// Fan-out slots issue their first calls in slot order, so call `i < count`
/// is the first attempt of slot `i`.
pub struct ScriptedClient {
    responder: Responder,
    calls: AtomicUsize,
    seen: Mutex<Vec<Transcript>>,
}

impl ScriptedClient {
    /// Decide each call with a closure
    pub fn from_fn(responder: impl Fn(usize) -> Step + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Play `steps` in order, then fail transiently
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self::from_fn(move |call| {
            steps
                .get(call)
                .cloned()
                .unwrap_or_else(|| Step::transient("script exhausted"))
        })
    }

    /// Same step for every call
    pub fn always(step: Step) -> Self {
        Self::from_fn(move |_| step.clone())
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcripts received, in call order
    pub fn seen(&self) -> Vec<Transcript> {
        self.seen.lock().clone()
    }
}

impl std::fmt::Debug for ScriptedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedClient")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, transcript: &Transcript) -> Result<GenerationOutput, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(transcript.clone());
        let step = (self.responder)(call);
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }
}

/// Valid blueprint: two emoji faces joined by an arrow
pub fn two_emoji_blueprint() -> Value {
    json!({
        "width": 400,
        "height": 200,
        "background_color": "#ffffff",
        "elements": [
            {"type": "emoji", "id": "happy", "emoji": "😀", "position": {"x": 40, "y": 60}, "size": 80,
             "caption": {"content": "happy", "position": {"x": 50, "y": 150}, "font_size": 18, "color": "#333333"}},
            {"type": "emoji", "id": "sad", "emoji": "😢", "position": {"x": 280, "y": 60}, "size": 80},
            {"type": "arrow", "start_id": "happy", "end_id": "sad", "color": "#888888", "thickness": 3,
             "position": {"start": {"x": 120, "y": 100}, "end": {"x": 280, "y": 100}}}
        ]
    })
}

/// Blueprint whose arrow points at a missing element
pub fn dangling_arrow_blueprint() -> Value {
    json!({
        "width": 200,
        "height": 200,
        "background_color": "white",
        "elements": [
            {"type": "emoji", "id": "a", "emoji": "🙂", "position": {"x": 0, "y": 0}, "size": 40},
            {"type": "arrow", "start_id": "a", "end_id": "ghost", "color": "black", "thickness": 1,
             "position": {"start": {"x": 20, "y": 20}, "end": {"x": 150, "y": 150}}}
        ]
    })
}

/// Successful client answer tagged with `label`
pub fn valid_output(label: &str) -> GenerationOutput {
    GenerationOutput::new(label, two_emoji_blueprint())
}

/// Client answer that fails validation
pub fn invalid_output() -> GenerationOutput {
    GenerationOutput::new("broken", dangling_arrow_blueprint())
}

/// Transcript of a single system message
pub fn system_transcript(content: &str) -> Transcript {
    vec![Message::system(content)].into()
}

/// Engine config with fast backoff for tests
pub fn test_config() -> EngineConfig {
    EngineConfig::new().with_base_delay(Duration::from_millis(10))
}

pub fn setup_engine(client: ScriptedClient) -> Engine<ScriptedClient> {
    Engine::new(client, test_config()).unwrap()
}
