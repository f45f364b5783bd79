//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::{is_message_addressed_to_bot, strip_bot_mention, Command};
use crate::telegram::router::{CallbackAction, Event, PhotoRendition};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Every branch converts its update into an [`Event`] and hands it to the
/// router, which owns verification, error reporting and the actual behavior.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(media_handler(deps.clone()))
        .branch(text_handler(deps.clone()))
        .branch(callback_handler(deps))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(user_id) = msg.from.as_ref().map(|u| u.id) else {
                    return Ok(());
                };
                log::info!("Command {:?} from user {} in chat {}", cmd, user_id.0, msg.chat.id);

                deps.dispatch(bot, msg.chat.id, user_id, command_event(cmd)).await;
                Ok(())
            }
        })
}

/// Photos, plus image-ish media that is not a photo, which gets the "send a valid image" answer.
fn media_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();
    Update::filter_message()
        .filter(|msg: Message| {
            msg.photo().is_some() || msg.document().is_some() || msg.sticker().is_some() || msg.animation().is_some()
        })
        .filter(move |msg: Message| {
            is_message_addressed_to_bot(&msg, deps_filter.bot_username.as_deref(), deps_filter.bot_id)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(user_id) = msg.from.as_ref().map(|u| u.id) else {
                    return Ok(());
                };

                let renditions = photo_renditions(&msg);
                log::info!(
                    "Media from user {} in chat {} ({} photo sizes)",
                    user_id.0,
                    msg.chat.id,
                    renditions.len()
                );

                deps.dispatch(bot, msg.chat.id, user_id, Event::Photo { renditions })
                    .await;
                Ok(())
            }
        })
}

fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .filter(move |msg: Message| {
            is_message_addressed_to_bot(&msg, deps_filter.bot_username.as_deref(), deps_filter.bot_id)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let (Some(user_id), Some(text)) =
                    (msg.from.as_ref().map(|u| u.id), message_text(&msg, deps.bot_username.as_deref()))
                else {
                    return Ok(());
                };

                deps.dispatch(bot, msg.chat.id, user_id, Event::Text(text)).await;
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // stops the button spinner whatever happens next
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query from user {}: {}", q.from.id.0, e);
            }

            let chat_id = callback_chat(&q);
            let action = CallbackAction::parse(q.data.as_deref().unwrap_or_default());
            log::info!("Callback {:?} from user {} in chat {}", action, q.from.id.0, chat_id);

            deps.dispatch(bot, chat_id, q.from.id, Event::Callback(action)).await;
            Ok(())
        }
    })
}

fn command_event(cmd: Command) -> Event {
    match cmd {
        Command::Start => Event::Start,
        Command::Help => Event::Help,
        Command::Tts => Event::Tts,
        Command::Translate(text) => Event::Translate { text },
    }
}

/// Every size Telegram sent for a photo; empty for other media.
fn photo_renditions(msg: &Message) -> Vec<PhotoRendition> {
    msg.photo()
        .unwrap_or_default()
        .iter()
        .map(|size| PhotoRendition {
            file_id: size.file.id.0.clone(),
            width: size.width,
            height: size.height,
        })
        .collect()
}

/// Message text as the user wrote it; in groups the bot's own mention is removed.
fn message_text(msg: &Message, bot_username: Option<&str>) -> Option<String> {
    let text = msg.text()?;
    match bot_username {
        Some(username) if !msg.chat.is_private() => Some(strip_bot_mention(text, username)),
        _ => Some(text.to_string()),
    }
}

/// Chat the button was pressed in, or the user's private chat for inline messages.
fn callback_chat(q: &CallbackQuery) -> ChatId {
    q.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId::from(q.from.id))
}
