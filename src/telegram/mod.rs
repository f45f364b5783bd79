//! Telegram bot integration and handlers

pub mod bot;
pub mod files;
pub mod gate;
pub mod handlers;
pub mod markdown;
pub mod outbox;
pub mod router;
pub mod texts;

// Re-exports for convenience
pub use bot::{create_bot, is_message_addressed_to_bot, setup_bot_commands, Command};
pub use files::TelegramFiles;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use outbox::{Outbox, Reply, TelegramOutbox};
pub use router::{CallbackAction, Event, Handler, HandlerContext, PhotoRendition, Request, Route, Router};
