use std::future::Future;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Telegram's hard limit for a text message, in characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Escapes all MarkdownV2 special characters.
///
/// # Example
///
/// ```
/// use textgate::core::utils::escape_markdown_v2;
///
/// let escaped = escape_markdown_v2("Hello. World!");
/// assert_eq!(escaped, "Hello\\. World\\!");
/// ```
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}'
            | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Escapes text placed inside a MarkdownV2 ``` block, where only `` ` `` and `\` are special.
pub fn escape_markdown_v2_code(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c == '`' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Cuts `text` to at most `max_chars` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Runs `fut` under a deadline; elapsed deadlines become `AppError::Timeout(label)`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use textgate::core::utils::with_deadline;
///
/// # async fn example() {
/// let value = with_deadline("lookup", Duration::from_secs(1), async { Ok(42) }).await;
/// assert_eq!(value.unwrap(), 42);
/// # }
/// ```
pub async fn with_deadline<T, F>(label: &'static str, deadline: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("{} exceeded its {:?} deadline", label, deadline);
            Err(AppError::Timeout(label))
        }
    }
}
