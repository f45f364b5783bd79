use thiserror::Error;

/// Centralized error types for the application
///
/// Handlers return these; the router turns them into a user-facing reply
/// instead of letting an update go unanswered.
///
/// # Example
///
/// ```no_run
/// use textgate::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Telegram file download errors
    #[error("Telegram download error: {0}")]
    TelegramDownload(#[from] teloxide::DownloadError),

    /// HTTP errors from the speech/translation engines
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP status code errors
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Image could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// OCR engine failure
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Speech synthesis failure
    #[error("Speech synthesis error: {0}")]
    Speech(String),

    /// Translation failure
    #[error("Translation error: {0}")]
    Translation(String),

    /// An outbound call exceeded its deadline
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Timeout(_) | AppError::Http(_) | AppError::TelegramDownload(_) => true,
            AppError::HttpStatus(status) => status.is_server_error() || status.as_u16() == 429,
            AppError::Telegram(e) => matches!(
                e,
                teloxide::RequestError::Network(_) | teloxide::RequestError::RetryAfter(_)
            ),
            _ => false,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_transient() {
        let err = AppError::Timeout("speech synthesis");
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "speech synthesis timed out");
    }

    #[test]
    fn test_status_errors() {
        assert!(AppError::HttpStatus(reqwest::StatusCode::SERVICE_UNAVAILABLE).is_transient());
        assert!(AppError::HttpStatus(reqwest::StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!AppError::HttpStatus(reqwest::StatusCode::BAD_REQUEST).is_transient());
    }

    #[test]
    fn test_ocr_error_is_not_transient() {
        assert!(!AppError::Ocr("tesseract exited with 1".into()).is_transient());
    }
}
