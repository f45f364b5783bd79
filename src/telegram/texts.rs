//! User-facing messages and inline keyboards

use indoc::{formatdoc, indoc};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::core::config::RequiredChats;
use crate::core::utils::{escape_markdown_v2, escape_markdown_v2_code, truncate_chars, TELEGRAM_MESSAGE_LIMIT};
use crate::services::LANGUAGES;

pub const CALLBACK_VERIFY: &str = "verify";
pub const CALLBACK_CANCEL: &str = "cancel";
pub const CALLBACK_LANG_PREFIX: &str = "lang_";

pub const WAIT_EXTRACTING: &str = "⏳ Please wait while I'm extracting text...";
pub const NO_TEXT_DETECTED: &str = "⚠️ No text detected. Try another image.";
pub const SEND_VALID_IMAGE: &str = "❌ Please send a valid image.";
pub const NO_CACHED_TEXT: &str = "⚠️ No extracted text found. Please send an image first.";
pub const CONVERTING_TO_SPEECH: &str = "🔊 Converting text to speech, please wait...";
pub const SEND_TEXT_TO_TRANSLATE: &str = "✍️ Send me the text you want to translate.";
pub const CHOOSE_LANGUAGE: &str = "🌍 Choose the language to translate into:";
pub const TRANSLATION_CANCELLED: &str = "❌ Translation cancelled.";
pub const NOTHING_TO_TRANSLATE: &str = "⚠️ Nothing to translate. Send an image or use /translate <text> first.";
pub const UNSUPPORTED_LANGUAGE: &str = "⚠️ This language is not supported.";
pub const TEXT_HINT: &str = "📷 Send me an image with text, or use /translate <text> to translate something.";
pub const VERIFICATION_SUCCESS: &str = "✅ Verification successful! You can now use the bot.";
pub const NOT_JOINED_YET: &str = "⚠️ You have not joined yet! Please join both and press the button again.";
pub const CHECK_FAILED: &str =
    "⚠️ I could not verify your membership right now. Please try again in a moment by pressing the button.";
pub const TIMED_OUT: &str = "⌛ That took too long. Please try again.";
pub const BAD_IMAGE: &str = "❌ I couldn't read that image. Please send a valid photo.";
pub const GENERIC_FAILURE: &str = "❌ Something went wrong. Please try again later.";

pub const SPEECH_FILE_NAME: &str = "speech.mp3";
pub const SPEECH_TITLE: &str = "Extracted text";

/// Shown after successful verification and on /start for verified users.
pub fn intro() -> &'static str {
    indoc! {r"
        🤖 *Welcome to the Image\-to\-Text & Translator Bot\!*

        📌 *How to use:*
        1️⃣ Send me an *image* with text and I will extract it for you\.
        2️⃣ Use /tts to hear the extracted text\.
        3️⃣ Use /translate to translate it into another language\.
        4️⃣ Use /help for more information\.

        🌟 *Try sending me an image now\!*
    "}
}

pub fn help() -> &'static str {
    indoc! {r"
        ℹ️ *Help*

        📷 Send a photo with text: I reply with the extracted text\.
        🔊 /tts reads the last extracted text aloud\.
        🌍 /translate `text` translates the given text\.
        🌍 /translate alone translates the last extracted text, or asks you for one\.

        You must stay a member of our channel and group to use the bot\.
    "}
}

/// Join prompt text shown to users that are not verified yet.
pub fn join_prompt() -> String {
    formatdoc! {r"
        🚀 *Welcome\!*

        To use this bot, please join our channel and group first, then press *{button}*\.
    ", button = escape_markdown_v2("✅ I Have Joined")}
}

pub fn join_keyboard(chats: &RequiredChats) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("📢 Join Channel", chats.channel_link.clone())],
        vec![InlineKeyboardButton::url("💬 Join Group", chats.group_link.clone())],
        vec![InlineKeyboardButton::callback("✅ I Have Joined", CALLBACK_VERIFY)],
    ])
}

/// Two languages per row, then a cancel row.
pub fn language_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = LANGUAGES
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|(code, name, flag)| {
                    InlineKeyboardButton::callback(
                        format!("{} {}", flag, name),
                        format!("{}{}", CALLBACK_LANG_PREFIX, code),
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback("❌ Cancel", CALLBACK_CANCEL)]);
    InlineKeyboardMarkup::new(rows)
}

/// Wraps `text` in a MarkdownV2 code block under `header`, clipped to fit one message.
fn code_block(header: &str, text: &str) -> String {
    let budget = TELEGRAM_MESSAGE_LIMIT.saturating_sub(header.chars().count() + 16);
    let mut keep = budget;
    loop {
        let body = escape_markdown_v2_code(&truncate_chars(text.trim(), keep));
        let len = body.chars().count();
        // escaping may push a clipped body past the limit again
        if len <= budget || keep == 0 {
            return format!("{}\n\n```\n{}\n```", header, body);
        }
        keep = keep.saturating_sub(len - budget);
    }
}

pub fn extracted_text(text: &str) -> String {
    code_block("📝 *Extracted Text:*", text)
}

pub fn translation(language: &str, text: &str) -> String {
    code_block(&format!("🌍 *Translation \\({}\\):*", escape_markdown_v2(language)), text)
}

pub fn translating_to(language: &str) -> String {
    format!("⏳ Translating to {}...", language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_join_keyboard_layout() {
        let chats = RequiredChats {
            channel_id: teloxide::types::ChatId(-1001),
            group_id: teloxide::types::ChatId(-1002),
            channel_link: "https://t.me/chan".parse().unwrap(),
            group_link: "https://t.me/grp".parse().unwrap(),
        };
        let kb = join_keyboard(&chats);

        assert_eq!(kb.inline_keyboard.len(), 3);
        assert!(matches!(
            &kb.inline_keyboard[0][0].kind,
            InlineKeyboardButtonKind::Url(url) if url.as_str() == "https://t.me/chan"
        ));
        assert!(matches!(
            &kb.inline_keyboard[2][0].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == CALLBACK_VERIFY
        ));
    }

    #[test]
    fn test_language_keyboard_has_every_language_and_cancel() {
        let kb = language_keyboard();
        let rows = &kb.inline_keyboard;

        assert_eq!(rows.len(), LANGUAGES.len().div_ceil(2) + 1);
        assert!(rows[..rows.len() - 1].iter().all(|row| row.len() <= 2));
        assert!(matches!(
            &rows[0][1].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "lang_es"
        ));
        assert!(matches!(
            &rows[rows.len() - 1][0].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == CALLBACK_CANCEL
        ));
    }

    #[test]
    fn test_extracted_text_fits_one_message() {
        let long = "`".repeat(5000);
        let msg = extracted_text(&long);
        assert!(msg.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(msg.starts_with("📝 *Extracted Text:*"));
    }

    #[test]
    fn test_translation_header_escapes_parens() {
        let msg = translation("Chinese", "你好");
        assert!(msg.starts_with("🌍 *Translation \\(Chinese\\):*"));
        assert!(msg.contains("你好"));
    }
}
