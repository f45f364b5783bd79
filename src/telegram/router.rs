//! Route table between parsed updates and handlers
//!
//! The dispatcher schema turns every Telegram update into a [`Request`] and
//! hands it to [`Router::dispatch`]. The router picks the handler registered
//! for the request's [`Route`], runs the verification gate for protected
//! handlers and converts any handler error into a short apology for the user,
//! so nothing escapes to the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

use super::gate::{Admission, VerificationGate};
use super::outbox::{Outbox, Reply};
use super::texts;
use crate::core::config::{self, RequiredChats};
use crate::core::error::{AppError, AppResult};
use crate::services::{FileSource, MembershipOracle, OcrEngine, SpeechEngine, Translator};
use crate::session::SessionStore;

/// One size of a photo as Telegram delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRendition {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

/// Parsed inline button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Verify,
    Language(String),
    Cancel,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        if data == texts::CALLBACK_VERIFY {
            CallbackAction::Verify
        } else if data == texts::CALLBACK_CANCEL {
            CallbackAction::Cancel
        } else if let Some(code) = data.strip_prefix(texts::CALLBACK_LANG_PREFIX) {
            CallbackAction::Language(code.to_string())
        } else {
            CallbackAction::Unknown(data.to_string())
        }
    }
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Help,
    Tts,
    Translate { text: String },
    /// Photo message; empty when the user sent some other kind of media.
    Photo { renditions: Vec<PhotoRendition> },
    Text(String),
    Callback(CallbackAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub event: Event,
}

impl Request {
    pub fn new(user_id: UserId, chat_id: ChatId, event: Event) -> Self {
        Self { user_id, chat_id, event }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Start,
    Help,
    Tts,
    Translate,
    Photo,
    Text,
    Verify,
    Language,
    Cancel,
}

impl Route {
    /// `None` for button payloads the bot never produced.
    pub fn of(event: &Event) -> Option<Route> {
        let route = match event {
            Event::Start => Route::Start,
            Event::Help => Route::Help,
            Event::Tts => Route::Tts,
            Event::Translate { .. } => Route::Translate,
            Event::Photo { .. } => Route::Photo,
            Event::Text(_) => Route::Text,
            Event::Callback(CallbackAction::Verify) => Route::Verify,
            Event::Callback(CallbackAction::Language(_)) => Route::Language,
            Event::Callback(CallbackAction::Cancel) => Route::Cancel,
            Event::Callback(CallbackAction::Unknown(_)) => return None,
        };
        Some(route)
    }
}

/// Deadlines applied to outbound calls.
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    pub membership: Duration,
    pub download: Duration,
    pub ocr: Duration,
    pub tts: Duration,
    pub translate: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            membership: config::timeouts::membership(),
            download: config::timeouts::download(),
            ocr: config::timeouts::ocr(),
            tts: config::timeouts::tts(),
            translate: config::timeouts::translate(),
        }
    }
}

/// Everything a handler may touch.
pub struct HandlerContext {
    pub chats: RequiredChats,
    pub sessions: SessionStore,
    pub membership: Arc<dyn MembershipOracle>,
    pub files: Arc<dyn FileSource>,
    pub ocr: Arc<dyn OcrEngine>,
    pub speech: Arc<dyn SpeechEngine>,
    pub translator: Arc<dyn Translator>,
    pub deadlines: Deadlines,
    pub tts_language: String,
}

impl HandlerContext {
    /// Session bounds, deadlines and the speech language come from the environment.
    pub fn new(
        chats: RequiredChats,
        membership: Arc<dyn MembershipOracle>,
        files: Arc<dyn FileSource>,
        ocr: Arc<dyn OcrEngine>,
        speech: Arc<dyn SpeechEngine>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            chats,
            sessions: SessionStore::from_config(),
            membership,
            files,
            ocr,
            speech,
            translator,
            deadlines: Deadlines::default(),
            tts_language: config::tts::LANGUAGE.clone(),
        }
    }
}

/// A unit of bot behavior bound to one route.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Protected handlers run only for verified users.
    fn protected(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()>;
}

pub struct Router {
    ctx: HandlerContext,
    gate: VerificationGate,
    routes: HashMap<Route, Arc<dyn Handler>>,
}

impl Router {
    /// An empty router; see [`Router::with_default_handlers`] for the bot's routes.
    pub fn new(ctx: HandlerContext) -> Self {
        Self {
            ctx,
            gate: VerificationGate,
            routes: HashMap::new(),
        }
    }

    /// Registers `handler` for `route`, replacing any previous one.
    #[must_use]
    pub fn route(mut self, route: Route, handler: impl Handler + 'static) -> Self {
        self.routes.insert(route, Arc::new(handler));
        self
    }

    pub fn with_default_handlers(ctx: HandlerContext) -> Self {
        use super::handlers::{commands, speech, translate, uploads};

        Self::new(ctx)
            .route(Route::Start, commands::StartHandler)
            .route(Route::Help, commands::HelpHandler)
            .route(Route::Verify, commands::VerifyHandler)
            .route(Route::Photo, uploads::PhotoHandler)
            .route(Route::Tts, speech::SpeechHandler)
            .route(Route::Translate, translate::TranslateCommandHandler)
            .route(Route::Text, translate::TextHandler)
            .route(Route::Language, translate::LanguageHandler)
            .route(Route::Cancel, translate::CancelHandler)
    }

    pub fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    /// Runs the request to completion; failures are reported to the user, never returned.
    pub async fn dispatch(&self, req: Request, out: &dyn Outbox) {
        let Some(route) = Route::of(&req.event) else {
            log::debug!("Ignoring unknown callback from user {}: {:?}", req.user_id.0, req.event);
            return;
        };
        let Some(handler) = self.routes.get(&route) else {
            log::debug!("No handler registered for {:?}", route);
            return;
        };

        if handler.protected() {
            match self.gate.admit(&self.ctx, req.user_id, out).await {
                Ok(Admission::Admitted) => {}
                Ok(Admission::Redirected) => {
                    log::info!("User {} redirected to the join flow from {:?}", req.user_id.0, route);
                    return;
                }
                Err(e) => {
                    report_failure(&req, route, &e, out).await;
                    return;
                }
            }
        }

        if let Err(e) = handler.handle(&self.ctx, &req, out).await {
            report_failure(&req, route, &e, out).await;
        }
    }
}

async fn report_failure(req: &Request, route: Route, err: &AppError, out: &dyn Outbox) {
    log::error!("{:?} failed for user {} in chat {}: {}", route, req.user_id.0, req.chat_id, err);

    let text = match err {
        AppError::Timeout(_) => texts::TIMED_OUT,
        AppError::Image(_) => texts::BAD_IMAGE,
        _ => texts::GENERIC_FAILURE,
    };
    if let Err(e) = out.send(Reply::plain(text)).await {
        log::warn!("Could not report failure to chat {}: {}", req.chat_id, e);
    }
}
