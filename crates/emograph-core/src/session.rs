//! Conversation history and candidate selection
//!
//! A [`Session`] is the explicit per-conversation state object. Its selection
//! state machine is:
//!
//! ```text
//! Idle --offer(non-empty)--> AwaitingSelection --select(i)--> Idle
//!                                     |
//!                      begin_turn / abandon
//!                                     v
//!                                    Idle
//! ```
//!
//! Only the selected candidate ever reaches history; the rest are dropped.

use crate::error::{RenderError, SelectionError};
use crate::fanout::GenerationCandidate;
use crate::transcript::{Message, Role, Transcript};
use chrono::{DateTime, Utc};
use emograph_blueprint::Blueprint;

/// Output of the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Rendering collaborator boundary: a validated blueprint in, an image out
pub trait Renderer {
    /// Render a blueprint
    ///
    /// # Errors
    /// Whatever the renderer cannot draw.
    fn render(&self, blueprint: &Blueprint) -> Result<RenderedImage, RenderError>;
}

/// Blueprint attached to an assistant turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub blueprint: Blueprint,
    /// Serialized YAML, fixed at selection time
    pub yaml: String,
    pub image: Option<RenderedImage>,
}

/// One entry of conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
            attachment: None,
            created_at: Utc::now(),
        }
    }

    fn assistant(content: String, attachment: Attachment) -> Self {
        Self {
            role: Role::Assistant,
            content,
            attachment: Some(attachment),
            created_at: Utc::now(),
        }
    }

    /// Transcript message for this turn
    ///
    /// Assistant turns embed their blueprint after the reply text as a fenced
    /// YAML block, so later requests see exactly what was chosen.
    #[must_use]
    pub fn to_message(&self) -> Message {
        match &self.attachment {
            Some(attachment) => Message::new(
                self.role,
                format!("{}\n\n```yaml\n{}```", self.content, attachment.yaml),
            ),
            None => Message::new(self.role, self.content.clone()),
        }
    }
}

/// Ticket identifying the turn a fan-out was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnToken(u64);

impl TurnToken {
    /// Turn number (1-based)
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Selection state for the current turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    AwaitingSelection {
        token: TurnToken,
        candidates: Vec<GenerationCandidate>,
    },
}

impl SelectionState {
    /// Check if candidates are pending
    #[inline]
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingSelection { .. })
    }
}

/// Per-conversation state
#[derive(Debug, Clone, Default)]
pub struct Session {
    system_prompt: Option<Message>,
    history: Vec<ConversationTurn>,
    state: SelectionState,
    turn: u64,
    /// Last turn that received its selection
    resolved: Option<TurnToken>,
}

impl Session {
    /// Create empty session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a system prompt leading every transcript
    #[inline]
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: Message) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Record new user input and snapshot the transcript for a fan-out
    ///
    /// Any pending candidates are discarded first, so candidate sets never mix
    /// across turns. The returned token must accompany [`Session::offer`].
    pub fn begin_turn(&mut self, input: impl Into<String>) -> (TurnToken, Transcript) {
        let discarded = self.abandon();
        if discarded > 0 {
            tracing::debug!(discarded, "new input discarded pending candidates");
        }

        self.turn += 1;
        self.history.push(ConversationTurn::user(input.into()));
        (TurnToken(self.turn), self.transcript())
    }

    /// Present candidates for selection
    ///
    /// # Errors
    /// - `StaleTurn` if newer input arrived after `token` was issued
    /// - `TurnResolved` if a candidate was already selected for this turn
    /// - `AlreadyAwaiting` if this turn already has pending candidates
    /// - `EmptyCandidateSet` if `candidates` is empty; the state stays `Idle`
    pub fn offer(
        &mut self,
        token: TurnToken,
        candidates: Vec<GenerationCandidate>,
    ) -> Result<&[GenerationCandidate], SelectionError> {
        if token.0 != self.turn {
            return Err(SelectionError::StaleTurn {
                offered: token.0,
                current: self.turn,
            });
        }
        if self.resolved == Some(token) {
            return Err(SelectionError::TurnResolved { turn: token.0 });
        }
        if self.state.is_awaiting() {
            return Err(SelectionError::AlreadyAwaiting);
        }
        if candidates.is_empty() {
            return Err(SelectionError::EmptyCandidateSet);
        }

        self.state = SelectionState::AwaitingSelection { token, candidates };
        Ok(self.pending())
    }

    /// Choose candidate `index` of the pending set
    ///
    /// Appends exactly one assistant turn and returns to `Idle`; the other
    /// candidates become unreachable and the turn accepts no further offers.
    ///
    /// # Errors
    /// - `NotAwaitingSelection` if nothing is pending
    /// - `IndexOutOfRange` if `index` is past the pending set (state unchanged)
    pub fn select(&mut self, index: usize) -> Result<&ConversationTurn, SelectionError> {
        self.select_inner(index, None::<&NoRender>)
    }

    /// Like [`Session::select`], attaching the rendered image to the turn
    ///
    /// # Errors
    /// As for [`Session::select`], plus `Render` if rendering fails; the
    /// candidates stay pending in that case.
    pub fn select_with<R: Renderer + ?Sized>(
        &mut self,
        index: usize,
        renderer: &R,
    ) -> Result<&ConversationTurn, SelectionError> {
        self.select_inner(index, Some(renderer))
    }

    fn select_inner<R: Renderer + ?Sized>(
        &mut self,
        index: usize,
        renderer: Option<&R>,
    ) -> Result<&ConversationTurn, SelectionError> {
        let SelectionState::AwaitingSelection { candidates, .. } = &self.state else {
            return Err(SelectionError::NotAwaitingSelection);
        };
        let Some(chosen) = candidates.get(index) else {
            return Err(SelectionError::IndexOutOfRange {
                index,
                len: candidates.len(),
            });
        };

        let yaml = chosen
            .blueprint
            .to_yaml()
            .map_err(|e| SelectionError::Serialization(e.to_string()))?;
        let image = renderer.map(|r| r.render(&chosen.blueprint)).transpose()?;

        let SelectionState::AwaitingSelection {
            token,
            mut candidates,
        } = std::mem::take(&mut self.state)
        else {
            return Err(SelectionError::NotAwaitingSelection);
        };
        self.resolved = Some(token);
        let chosen = candidates.swap_remove(index);
        tracing::info!(
            slot = chosen.index,
            discarded = candidates.len(),
            "candidate selected"
        );

        let attachment = Attachment {
            blueprint: chosen.blueprint,
            yaml,
            image,
        };
        self.history
            .push(ConversationTurn::assistant(chosen.response, attachment));

        Ok(&self.history[self.history.len() - 1])
    }

    /// Drop pending candidates, returning how many were discarded
    pub fn abandon(&mut self) -> usize {
        match std::mem::take(&mut self.state) {
            SelectionState::Idle => 0,
            SelectionState::AwaitingSelection { candidates, .. } => candidates.len(),
        }
    }

    /// Pending candidates (empty when idle)
    #[must_use]
    pub fn pending(&self) -> &[GenerationCandidate] {
        match &self.state {
            SelectionState::Idle => &[],
            SelectionState::AwaitingSelection { candidates, .. } => candidates,
        }
    }

    /// Current selection state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Conversation history
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// System prompt, if any
    #[inline]
    #[must_use]
    pub fn system_prompt(&self) -> Option<&Message> {
        self.system_prompt.as_ref()
    }

    /// Transcript of the system prompt followed by every history turn
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        self.system_prompt
            .iter()
            .cloned()
            .chain(self.history.iter().map(ConversationTurn::to_message))
            .collect()
    }
}

/// Placeholder renderer type for selections without rendering
enum NoRender {}

impl Renderer for NoRender {
    fn render(&self, _blueprint: &Blueprint) -> Result<RenderedImage, RenderError> {
        match *self {}
    }
}
