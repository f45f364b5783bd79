//! Replies produced by handlers and the sink that delivers them

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile};

use crate::core::error::AppResult;
use crate::telegram::markdown::send_message_markdown_v2;

/// One outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        /// MarkdownV2 when true, plain text otherwise
        markdown: bool,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    /// Audio attachment; the buffer belongs to the request that produced it.
    Audio {
        data: Vec<u8>,
        file_name: String,
        title: Option<String>,
    },
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            markdown: false,
            keyboard: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            markdown: true,
            keyboard: None,
        }
    }

    /// Attaches an inline keyboard; audio replies are returned unchanged.
    #[must_use]
    pub fn with_keyboard(self, kb: InlineKeyboardMarkup) -> Self {
        match self {
            Reply::Text { text, markdown, .. } => Reply::Text {
                text,
                markdown,
                keyboard: Some(kb),
            },
            audio => audio,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text { text, .. } => Some(text),
            Reply::Audio { .. } => None,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboardMarkup> {
        match self {
            Reply::Text { keyboard, .. } => keyboard.as_ref(),
            Reply::Audio { .. } => None,
        }
    }
}

/// Destination for the replies of a single request.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, reply: Reply) -> AppResult<()>;
}

/// Sends replies to a Telegram chat as they are produced.
pub struct TelegramOutbox {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramOutbox {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Outbox for TelegramOutbox {
    async fn send(&self, reply: Reply) -> AppResult<()> {
        match reply {
            Reply::Text {
                text,
                markdown: true,
                keyboard,
            } => {
                send_message_markdown_v2(&self.bot, self.chat_id, text, keyboard).await?;
            }
            Reply::Text {
                text,
                markdown: false,
                keyboard,
            } => {
                let mut req = self.bot.send_message(self.chat_id, text);
                if let Some(kb) = keyboard {
                    req = req.reply_markup(kb);
                }
                req.await?;
            }
            Reply::Audio { data, file_name, title } => {
                let size = data.len();
                let mut req = self
                    .bot
                    .send_audio(self.chat_id, InputFile::memory(data).file_name(file_name));
                if let Some(title) = title {
                    req = req.title(title);
                }
                req.await?;
                log::info!("Sent {} bytes of audio to chat {}", size, self.chat_id);
            }
        }
        Ok(())
    }
}
