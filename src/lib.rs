//! Textgate - Telegram bot that reads text from images
//!
//! Users who belong to the required channel and group can send a photo and
//! get its text back, listen to it with `/tts` or translate it with `/translate`.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and small helpers
//! - `services`: membership, OCR, speech and translation behind traits
//! - `session`: per-user state (verification, last text, pending translation)
//! - `telegram`: dispatcher schema, router, verification gate and handlers

pub mod cli;
pub mod core;
pub mod services;
pub mod session;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use session::SessionStore;
pub use telegram::{HandlerContext, Router};
