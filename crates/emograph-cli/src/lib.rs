//! Emograph CLI
//!
//! Library half of the `emograph` binary:
//! - [`cli`]: argument definitions
//! - [`commands`]: validate / format / generate
//! - [`fixture`]: replaying generation client for offline runs
//! - [`logging`]: tracing subscriber setup

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cli;
pub mod commands;
pub mod fixture;
pub mod logging;

pub use cli::build_cli;
pub use commands::GenerateArgs;
pub use fixture::FixtureClient;
