//! Emograph Core - multi-candidate blueprint generation
//!
//! Turns a conversation into several independently generated scene
//! blueprints for the user to choose from:
//! - Calls an abstract generation client for each candidate
//! - Retries each candidate with linear backoff until its output validates
//! - Fans out concurrently and keeps only the successes, in slot order
//! - Holds the pending candidates until exactly one is selected
//!
//! # Example
//!
//! ```rust,ignore
//! use emograph_core::{Engine, EngineConfig, Message, Session};
//!
//! # async fn example(client: impl emograph_core::GenerationClient) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::new(client, EngineConfig::new())?;
//! let mut session = Session::new().with_system_prompt(Message::system("Draw the idea."));
//!
//! let candidates = engine.process_turn(&mut session, "happy and sad faces").await?;
//! println!("{} candidates", candidates.len());
//!
//! let turn = session.select(0)?;
//! println!("{}", turn.content);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod retry;
pub mod session;
pub mod transcript;

// Re-exports for convenience
pub use client::{GenerationClient, GenerationOutput};
pub use config::{load_prompt, load_system_config, EngineConfig, SystemConfig, UiConfig};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, GenerationError, RenderError, SelectionError};
pub use fanout::{BatchId, FanOut, FanOutReport, GenerationCandidate, SlotOutcome};
pub use retry::{Generated, RetryPolicy, RetryingGenerator};
pub use session::{
    Attachment, ConversationTurn, RenderedImage, Renderer, SelectionState, Session, TurnToken,
};
pub use transcript::{Message, Role, Transcript};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Emograph Core
    pub use crate::{
        Engine, EngineConfig, EngineError, GenerationCandidate, GenerationClient,
        GenerationError, GenerationOutput, Message, Session, Transcript,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
