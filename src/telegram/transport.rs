//! Chat transport seam between the batch controller and Telegram.
//!
//! The batch controller only talks to a [`ChatTransport`]; the teloxide-backed
//! [`TelegramTransport`] is bound to the chat a link arrived from. Tests swap
//! in a recording transport.

use crate::core::error::AppResult;
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};

/// Reference to a status message that can be edited later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHandle(pub i32);

/// Outbound operations one batch needs from the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post a new plain text status message.
    async fn send_status(&self, text: &str) -> AppResult<StatusHandle>;

    /// Replace the text of a status message sent earlier.
    async fn edit_status(&self, handle: StatusHandle, text: &str) -> AppResult<()>;

    /// Upload a local file as a photo attachment.
    async fn send_photo(&self, path: &Path, caption: Option<&str>) -> AppResult<()>;

    /// Upload a local file as a video attachment.
    async fn send_video(&self, path: &Path, caption: Option<&str>) -> AppResult<()>;
}

/// Teloxide implementation bound to a single chat.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramTransport {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_status(&self, text: &str) -> AppResult<StatusHandle> {
        let message = self.bot.send_message(self.chat_id, text).await?;
        Ok(StatusHandle(message.id.0))
    }

    async fn edit_status(&self, handle: StatusHandle, text: &str) -> AppResult<()> {
        self.bot
            .edit_message_text(self.chat_id, MessageId(handle.0), text)
            .await?;
        Ok(())
    }

    async fn send_photo(&self, path: &Path, caption: Option<&str>) -> AppResult<()> {
        let mut request = self.bot.send_photo(self.chat_id, InputFile::file(path));
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        request.await?;
        Ok(())
    }

    async fn send_video(&self, path: &Path, caption: Option<&str>) -> AppResult<()> {
        let mut request = self
            .bot
            .send_video(self.chat_id, InputFile::file(path))
            .supports_streaming(true);
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        request.await?;
        Ok(())
    }
}
