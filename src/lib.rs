//! igrelay - Telegram bot that relays Instagram media into the chat
//!
//! A user sends a link to an Instagram post, reel or IGTV video; the bot
//! resolves every media item behind it, downloads each one into a
//! batch-scoped working directory and uploads it back as a native photo or
//! video.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and link validation
//! - `download`: identifier extraction, media resolvers, downloader and the
//!   batch controller
//! - `telegram`: bot construction, dispatcher schema and the chat transport

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{AppError, AppResult, BotConfig, PipelineConfig};
pub use download::pipeline::{BatchController, BatchReport, BatchState};
pub use download::{MediaKind, MediaReference};
pub use telegram::{schema, ChatTransport, HandlerDeps, TelegramTransport};
