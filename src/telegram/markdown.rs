use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};
use teloxide::RequestError;

fn is_markdown_parse_error(err: &RequestError) -> bool {
    err.to_string().to_lowercase().contains("can't parse entities")
}

/// Send a MarkdownV2 message; when Telegram rejects the entities, resend the same text
/// without a parse mode so the user never sees escape backslashes.
pub async fn send_message_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let raw_text = text.into();
    let mut req = bot
        .send_message(chat_id, raw_text.clone())
        .parse_mode(ParseMode::MarkdownV2);
    if let Some(kb) = keyboard.clone() {
        req = req.reply_markup(kb);
    }

    match req.await {
        Ok(msg) => Ok(msg),
        Err(e) if is_markdown_parse_error(&e) => {
            log::warn!("MarkdownV2 rejected for chat {}, resending as plain text: {}", chat_id, e);
            let mut retry = bot.send_message(chat_id, plain_fallback(&raw_text));
            if let Some(kb) = keyboard {
                retry = retry.reply_markup(kb);
            }
            retry.await
        }
        Err(e) => Err(e),
    }
}

/// Drops MarkdownV2 escapes and code fences from text that was meant to be rendered.
fn plain_fallback(markdown: &str) -> String {
    let unfenced = markdown.replace("```", "");
    let mut out = String::with_capacity(unfenced.len());
    let mut chars = unfenced.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_parse_error() {
        let err = RequestError::Api(teloxide::ApiError::Unknown(
            "Bad Request: can't parse entities: Character '.' is reserved".to_string(),
        ));
        assert!(is_markdown_parse_error(&err));
    }

    #[test]
    fn test_other_errors_are_not_parse_errors() {
        let err = RequestError::Api(teloxide::ApiError::BotBlocked);
        assert!(!is_markdown_parse_error(&err));
    }

    #[test]
    fn test_plain_fallback_has_no_backslashes() {
        assert_eq!(plain_fallback("Version 1.2 is out"), "Version 1.2 is out");
        assert_eq!(plain_fallback("Done\\! \\(v1\\.2\\)"), "Done! (v1.2)");
        assert_eq!(plain_fallback("```\npath C:\\\\tmp\n```"), "path C:\\tmp");
    }
}
