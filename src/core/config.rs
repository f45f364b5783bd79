use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;
use teloxide::types::ChatId;
use url::Url;

use crate::core::error::{AppError, AppResult};

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (local telegram-bot-api), optional
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: textgate.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "textgate.log".to_string()));

/// Webhook URL for Telegram updates
/// Read from WEBHOOK_URL environment variable
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| env::var("WEBHOOK_URL").ok());

/// Local port the webhook listener binds to
/// Default: 8080
pub static WEBHOOK_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEBHOOK_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
});

/// Temporary files directory for OCR input images
/// Read from TEMP_FILES_DIR environment variable, defaults to the OS temp dir
pub static TEMP_FILES_DIR: Lazy<String> = Lazy::new(|| {
    env::var("TEMP_FILES_DIR").unwrap_or_else(|_| env::temp_dir().to_string_lossy().into_owned())
});

/// OCR engine configuration
pub mod ocr {
    use super::{env, Lazy};

    /// Tesseract binary, read from TESSERACT_BIN
    pub static TESSERACT_BIN: Lazy<String> =
        Lazy::new(|| env::var("TESSERACT_BIN").unwrap_or_else(|_| "tesseract".to_string()));

    /// Tesseract language pack(s), e.g. "eng" or "eng+deu"
    pub static LANGUAGE: Lazy<String> = Lazy::new(|| env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string()));
}

/// Speech synthesis configuration
pub mod tts {
    use super::{env, Lazy};

    /// Google Translate TTS endpoint
    pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

    /// Endpoint override, read from TTS_ENDPOINT
    pub static ENDPOINT: Lazy<String> =
        Lazy::new(|| env::var("TTS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()));

    /// Language used for /tts, read from TTS_LANGUAGE
    pub static LANGUAGE: Lazy<String> = Lazy::new(|| env::var("TTS_LANGUAGE").unwrap_or_else(|_| "en".to_string()));

    /// Max characters per request, the endpoint rejects longer input
    pub const MAX_CHUNK_CHARS: usize = 100;
}

/// Translation engine configuration
pub mod translate {
    use super::{env, Lazy};

    /// Google Translate web endpoint
    pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

    /// Endpoint override, read from TRANSLATE_ENDPOINT
    pub static ENDPOINT: Lazy<String> =
        Lazy::new(|| env::var("TRANSLATE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()));
}

/// Session store configuration
pub mod session {
    use super::{env, Duration, Lazy};

    /// Maximum number of live sessions, read from SESSION_MAX_CAPACITY
    pub static MAX_CAPACITY: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_MAX_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100_000)
    });

    /// Idle time after which a session is evicted, read from SESSION_IDLE_TTL_SECS
    pub static IDLE_TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("SESSION_IDLE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24 * 60 * 60)
    });

    pub fn idle_ttl() -> Duration {
        Duration::from_secs(*IDLE_TTL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for the Bot API HTTP client (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Startup and dispatcher restart policy
pub mod retry {
    use super::Duration;

    /// Attempts to reach the Bot API at startup (getMe)
    pub const STARTUP_MAX_RETRIES: u32 = 60;

    /// Delay between startup attempts (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher restarts after a panic before giving up
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Base delay between dispatcher restarts (in seconds)
    pub const DISPATCHER_DELAY_SECS: u64 = 5;

    pub fn startup_delay() -> Duration {
        Duration::from_secs(STARTUP_RETRY_DELAY_SECS)
    }

    /// Grows linearly with the attempt number
    pub fn dispatcher_delay(attempt: u32) -> Duration {
        Duration::from_secs(DISPATCHER_DELAY_SECS * u64::from(attempt.max(1)))
    }
}

/// Deadlines for outbound calls made by handlers
pub mod timeouts {
    use super::Duration;

    pub const MEMBERSHIP_SECS: u64 = 10;
    pub const DOWNLOAD_SECS: u64 = 30;
    pub const OCR_SECS: u64 = 60;
    pub const TTS_SECS: u64 = 45;
    pub const TRANSLATE_SECS: u64 = 20;

    pub fn membership() -> Duration {
        Duration::from_secs(MEMBERSHIP_SECS)
    }

    pub fn download() -> Duration {
        Duration::from_secs(DOWNLOAD_SECS)
    }

    pub fn ocr() -> Duration {
        Duration::from_secs(OCR_SECS)
    }

    pub fn tts() -> Duration {
        Duration::from_secs(TTS_SECS)
    }

    pub fn translate() -> Duration {
        Duration::from_secs(TRANSLATE_SECS)
    }
}

/// The channel and group a user must belong to, with their invite links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredChats {
    pub channel_id: ChatId,
    pub group_id: ChatId,
    pub channel_link: Url,
    pub group_link: Url,
}

impl RequiredChats {
    /// Reads CHANNEL_ID, GROUP_ID, CHANNEL_LINK and GROUP_LINK.
    ///
    /// # Errors
    /// Returns `AppError::Config` when a variable is missing or malformed.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            channel_id: chat_id_var("CHANNEL_ID")?,
            group_id: chat_id_var("GROUP_ID")?,
            channel_link: url_var("CHANNEL_LINK")?,
            group_link: url_var("GROUP_LINK")?,
        })
    }
}

fn required_var(name: &str) -> AppResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::Config(format!("{} environment variable not set", name))),
    }
}

fn chat_id_var(name: &str) -> AppResult<ChatId> {
    let raw = required_var(name)?;
    raw.parse::<i64>()
        .map(ChatId)
        .map_err(|e| AppError::Config(format!("{} must be a numeric chat id, got {:?}: {}", name, raw, e)))
}

fn url_var(name: &str) -> AppResult<Url> {
    let raw = required_var(name)?;
    Url::parse(&raw).map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", name, e)))
}
