//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::messages;
use crate::telegram::transport::TelegramTransport;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Known commands go first; any other text that is not a command is treated as
/// a link and handed to the batch controller.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

/// Text worth running a batch for: anything except slash commands.
pub fn is_link_candidate(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.starts_with('/')
}

/// Handler for bot commands (/start, /help)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

            match cmd {
                Command::Start | Command::Help => {
                    if let Err(e) = bot.send_message(msg.chat.id, messages::HELP_TEXT).await {
                        log::error!("Failed to send help to chat {}: {}", msg.chat.id, e);
                    }
                }
            }
            Ok(())
        },
    ))
}

/// Handler for plain text messages carrying a post link
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(is_link_candidate).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default().to_string();
                log::info!("Link message from chat {}: {}", msg.chat.id, text);

                let transport = TelegramTransport::new(bot, msg.chat.id);
                let report = deps.controller.run(&text, &transport).await;
                log::debug!("Report for chat {}: {:?}", msg.chat.id, report.state);
                Ok(())
            }
        })
}
