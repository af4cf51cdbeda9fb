//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the Telegram bot.
//! The handlers are organized in a testable way, allowing integration tests
//! to use the same handler tree as production code.

mod schema;
mod types;

pub use schema::{is_link_candidate, schema};
pub use types::{HandlerDeps, HandlerError};
