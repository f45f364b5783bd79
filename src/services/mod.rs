//! External collaborators behind small request/response traits
//!
//! - `membership`: chat membership lookups and the two-chat reduction
//! - `ocr`: image bytes to text (Tesseract)
//! - `tts`: text to MP3 bytes (Google Translate TTS)
//! - `translate`: text to text (Google Translate)
//!
//! Handlers only see the traits, so tests plug in in-memory fakes.

pub mod membership;
pub mod ocr;
pub mod translate;
pub mod tts;

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

use crate::core::error::AppResult;

pub use membership::{check_membership, MembershipStatus, TelegramMembership};
pub use ocr::TesseractOcr;
pub use translate::{language_name, GoogleTranslator, LANGUAGES};
pub use tts::GoogleTts;

/// Answers whether a user currently belongs to a chat.
#[async_trait]
pub trait MembershipOracle: Send + Sync {
    async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool>;
}

/// Fetches the bytes of a file the user sent.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn download(&self, file_id: &str) -> AppResult<Vec<u8>>;
}

/// Turns image bytes into plain text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> AppResult<String>;
}

/// Turns text into audio bytes (MP3).
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> AppResult<Vec<u8>>;
}

/// Translates text into the target language, source language auto-detected.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String>;
}
