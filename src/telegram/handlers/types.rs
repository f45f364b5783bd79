//! Handler types and dependencies

use std::sync::Arc;

use teloxide::prelude::*;

use crate::telegram::outbox::TelegramOutbox;
use crate::telegram::router::{Event, Request, Router};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub router: Arc<Router>,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(router: Arc<Router>, bot_username: Option<String>, bot_id: UserId) -> Self {
        Self {
            router,
            bot_username,
            bot_id,
        }
    }

    /// Routes one event and delivers its replies to `chat_id` as they are produced.
    pub async fn dispatch(&self, bot: Bot, chat_id: ChatId, user_id: UserId, event: Event) {
        let outbox = TelegramOutbox::new(bot, chat_id);
        self.router
            .dispatch(Request::new(user_id, chat_id, event), &outbox)
            .await;
    }
}
