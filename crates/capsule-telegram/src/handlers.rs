//! Update handlers for the Telegram bot.
//!
//! Handlers translate teloxide messages into router events, route them
//! through the shared state and dispatch the resulting actions. Send
//! failures are logged by the state and never fail the handler.

use std::sync::Arc;

use capsule_core::{Inbound, InboundKind, COMPOSE_LABEL, RETRIEVE_LABEL};
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, MessageEntity, MessageEntityKind};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and show the capsule keyboard")]
    Start,

    #[command(description = "Show help message")]
    Help,
}

impl From<Command> for capsule_core::Command {
    fn from(cmd: Command) -> Self {
        match cmd {
            Command::Start => capsule_core::Command::Start,
            Command::Help => capsule_core::Command::Help,
        }
    }
}

/// The two-button reply keyboard offered on /start.
pub fn reply_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(COMPOSE_LABEL),
        KeyboardButton::new(RETRIEVE_LABEL),
    ]])
}

/// Whether the entities mark a bot command at the very start of the text.
///
/// Telegram tags `/command` tokens with a `bot_command` entity; text that
/// merely begins with a slash ("/ see you soon", "//note") carries none.
pub fn starts_with_bot_command(entities: Option<&[MessageEntity]>) -> bool {
    entities
        .unwrap_or_default()
        .iter()
        .any(|e| e.offset == 0 && e.kind == MessageEntityKind::BotCommand)
}

/// Whether a message is a bot command, known or not.
pub fn is_bot_command(msg: &Message) -> bool {
    starts_with_bot_command(msg.entities())
}

/// Build a router event from a message.
///
/// The sender's user id keys the capsule; messages without a sender fall
/// back to the chat id.
pub fn inbound_from_message(msg: &Message, kind: InboundKind) -> Inbound {
    let chat_id = msg.chat.id.0;
    let user_id = msg
        .from
        .as_ref()
        .and_then(|u| i64::try_from(u.id.0).ok())
        .unwrap_or(chat_id);

    Inbound {
        chat_id,
        user_id,
        message_id: msg.id.0,
        kind,
    }
}

async fn route_and_dispatch(bot: &Bot, msg: &Message, kind: InboundKind, state: &BotState) {
    let inbound = inbound_from_message(msg, kind);
    let actions = state.route(inbound, Utc::now()).await;
    state.dispatch(bot, actions).await;
}

/// Handle /start and /help.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, command = ?cmd, "Command received");
    route_and_dispatch(&bot, &msg, InboundKind::Command(cmd.into()), &state).await;
    Ok(())
}

/// Handle a `/command` that did not parse as a known command.
pub async fn handle_unknown_command(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let name = text.split_whitespace().next().unwrap_or(text).to_string();

    info!(chat_id = %msg.chat.id, cmd = %name, "Unrecognized command");
    route_and_dispatch(&bot, &msg, InboundKind::UnknownCommand(name), &state).await;
    Ok(())
}

/// Handle free text: keyboard labels, capsule content or anything else.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    debug!(chat_id = %msg.chat.id, "Text message received");
    route_and_dispatch(&bot, &msg, InboundKind::Text(text.to_string()), &state).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::ReplyMarkup;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start", "capsule_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/help@capsule_bot", "capsule_bot").unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_unknown_command_fails() {
        assert!(Command::parse("/cancel", "capsule_bot").is_err());
    }

    #[test]
    fn test_command_maps_to_core() {
        assert_eq!(capsule_core::Command::from(Command::Start), capsule_core::Command::Start);
        assert_eq!(capsule_core::Command::from(Command::Help), capsule_core::Command::Help);
    }

    #[test]
    fn test_descriptions_list_commands() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/start"));
        assert!(help.contains("/help"));
    }

    #[test]
    fn test_command_entity_at_start() {
        let entities = [MessageEntity::new(MessageEntityKind::BotCommand, 0, 7)];
        assert!(starts_with_bot_command(Some(&entities[..])));
    }

    #[test]
    fn test_slash_text_without_entity_is_not_command() {
        // "/ see you in September" and "//note" arrive without a bot_command entity
        assert!(!starts_with_bot_command(None));
        assert!(!starts_with_bot_command(Some(&[])));
    }

    #[test]
    fn test_command_entity_later_in_text_is_not_command() {
        let entities = [
            MessageEntity::new(MessageEntityKind::Bold, 0, 4),
            MessageEntity::new(MessageEntityKind::BotCommand, 10, 5),
        ];
        assert!(!starts_with_bot_command(Some(&entities[..])));
    }

    #[test]
    fn test_reply_keyboard_has_both_labels() {
        let keyboard = reply_keyboard();
        let labels: Vec<&str> = keyboard.keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec![COMPOSE_LABEL, RETRIEVE_LABEL]);

        let _markup: ReplyMarkup = keyboard.into();
    }
}
