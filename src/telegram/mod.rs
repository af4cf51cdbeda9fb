//! Telegram bot integration: bot setup, handler tree, chat transport and
//! delivery of downloaded media.

pub mod bot;
pub mod delivery;
pub mod handlers;
pub mod messages;
pub mod transport;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use delivery::{caption_for, deliver};
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use transport::{ChatTransport, StatusHandle, TelegramTransport};
