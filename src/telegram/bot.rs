//! Bot construction, command list and group addressing

use std::ops::Range;

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::{ChatKind, Message, MessageEntityKind, UserId};
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Commands shown in the Telegram menu.
///
/// `/translate` takes the rest of the line; an empty argument means
/// "translate the last extracted text, or ask me for one".
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "check channel/group membership and show the intro")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "read the last extracted text aloud")]
    Tts,
    #[command(description = "translate text or the last extracted text")]
    Translate(String),
}

/// Creates the bot with a timeout-bound HTTP client and the optional local Bot API server.
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.as_str();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    match config::BOT_API_URL.as_deref() {
        Some(api_url) => {
            log::info!("Using custom Bot API URL: {}", api_url);
            let url = url::Url::parse(api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Publishes the command list in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Whether a message should be handled at all.
///
/// Private chats always count. In groups the bot reacts only to replies to
/// its own messages and to explicit `@mentions`, in text or in a photo caption.
pub fn is_message_addressed_to_bot(msg: &Message, bot_username: Option<&str>, bot_id: UserId) -> bool {
    if matches!(msg.chat.kind, ChatKind::Private(_)) {
        return true;
    }

    let replied_to_bot = msg
        .reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .is_some_and(|from| from.id == bot_id);
    if replied_to_bot {
        return true;
    }

    let Some(username) = bot_username else {
        return false;
    };

    let entities = msg.parse_entities().or_else(|| msg.parse_caption_entities());
    let mentioned = entities.into_iter().flatten().any(|entity| {
        matches!(entity.kind(), MessageEntityKind::Mention)
            && entity
                .text()
                .strip_prefix('@')
                .is_some_and(|name| name.eq_ignore_ascii_case(username))
    });
    if mentioned {
        return true;
    }

    msg.text()
        .or_else(|| msg.caption())
        .is_some_and(|body| find_mention(body, username).is_some())
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte range of the first standalone `@username` in `text`, matched case-insensitively.
fn find_mention(text: &str, username: &str) -> Option<Range<usize>> {
    text.match_indices('@').find_map(|(at, _)| {
        let start = at + 1;
        let end = start + username.len();
        let name = text.get(start..end)?;
        let preceded = text[..at].chars().next_back().is_some_and(is_username_char);
        let followed = text[end..].chars().next().is_some_and(is_username_char);
        (name.eq_ignore_ascii_case(username) && !preceded && !followed).then_some(at..end)
    })
}

/// Removes every `@username` mention from a group message, keeping the rest of the
/// text (line breaks included) as written.
pub fn strip_bot_mention(text: &str, username: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(range) = find_mention(rest, username) {
        out.push_str(&rest[..range.start]);
        rest = &rest[range.end..];
        if out.is_empty() || out.ends_with(char::is_whitespace) {
            rest = rest.strip_prefix(' ').unwrap_or(rest);
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    const BOT: &str = "textgate_bot";
    const BOT_ID: UserId = UserId(987654321);

    fn user(id: u64) -> Value {
        json!({ "id": id, "is_bot": false, "first_name": "Test", "username": "testuser" })
    }

    fn group() -> Value {
        json!({ "id": -100123, "type": "supergroup", "title": "G" })
    }

    fn message(chat: Value, extra: Value) -> Message {
        let mut json = json!({
            "message_id": 1,
            "date": 1735992000,
            "chat": chat,
            "from": user(5)
        });
        if let (Some(target), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(json).expect("Failed to deserialize message")
    }

    #[test]
    fn test_private_messages_are_always_addressed() {
        let chat = json!({ "id": 5, "type": "private", "first_name": "Test" });
        let msg = message(chat, json!({ "text": "hello" }));
        assert!(is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));
    }

    #[test]
    fn test_group_reply_to_bot_is_addressed() {
        let reply_to = json!({
            "message_id": 0,
            "date": 1735991000,
            "chat": group(),
            "from": { "id": BOT_ID.0, "is_bot": true, "first_name": "TextGate", "username": BOT },
            "text": "📝 Extracted Text"
        });
        let msg = message(group(), json!({ "text": "translate this", "reply_to_message": reply_to }));
        assert!(is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));
    }

    #[test]
    fn test_group_reply_to_someone_else_is_ignored() {
        let reply_to = json!({
            "message_id": 0,
            "date": 1735991000,
            "chat": group(),
            "from": user(6),
            "text": "hi"
        });
        let msg = message(group(), json!({ "text": "hi back", "reply_to_message": reply_to }));
        assert!(!is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));
    }

    #[test]
    fn test_group_text_mention_is_addressed() {
        let msg = message(
            group(),
            json!({
                "text": "@TextGate_bot hello",
                "entities": [{ "type": "mention", "offset": 0, "length": 13 }]
            }),
        );
        assert!(is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));
    }

    #[test]
    fn test_group_caption_mention_is_addressed() {
        let msg = message(
            group(),
            json!({
                "photo": [{ "file_id": "p1", "file_unique_id": "u1", "width": 90, "height": 90, "file_size": 100 }],
                "caption": "read this @textgate_bot",
                "caption_entities": [{ "type": "mention", "offset": 10, "length": 13 }]
            }),
        );
        assert!(is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));
    }

    #[test]
    fn test_unaddressed_group_message_is_ignored() {
        let msg = message(group(), json!({ "text": "hello everyone" }));
        assert!(!is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));

        let msg = message(group(), json!({ "text": "ask @textgate_botty instead" }));
        assert!(!is_message_addressed_to_bot(&msg, Some(BOT), BOT_ID));

        let msg = message(group(), json!({ "text": "@textgate_bot hi" }));
        assert!(!is_message_addressed_to_bot(&msg, None, BOT_ID));
    }

    #[test]
    fn test_strip_bot_mention_keeps_layout() {
        assert_eq!(strip_bot_mention("@TextGate_bot hello world", BOT), "hello world");
        assert_eq!(
            strip_bot_mention("@textgate_bot\nline one\n  line two\n\nline four", BOT),
            "line one\n  line two\n\nline four"
        );
        assert_eq!(strip_bot_mention("translate @textgate_bot please", BOT), "translate please");
        assert_eq!(strip_bot_mention("ask @textgate_botty", BOT), "ask @textgate_botty");
        assert_eq!(strip_bot_mention("mail me at me@textgate_bot", BOT), "mail me at me@textgate_bot");
    }

    #[test]
    fn test_command_descriptions() {
        let list = Command::descriptions().to_string();

        assert!(list.contains("Available commands"));
        assert!(list.contains("/start"));
        assert!(list.contains("/tts"));
        assert!(list.contains("/translate"));
    }

    #[test]
    fn test_translate_takes_rest_of_line() {
        let cmd = Command::parse("/translate Hello there", "textgate_bot").unwrap();
        assert_eq!(cmd, Command::Translate("Hello there".to_string()));

        let cmd = Command::parse("/translate", "textgate_bot").unwrap();
        assert_eq!(cmd, Command::Translate(String::new()));
    }

    #[test]
    fn test_unit_commands_parse() {
        assert_eq!(Command::parse("/tts", "textgate_bot").unwrap(), Command::Tts);
        assert_eq!(Command::parse("/start@textgate_bot", "textgate_bot").unwrap(), Command::Start);
    }
}
