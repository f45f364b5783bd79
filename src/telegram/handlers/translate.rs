//! Translation conversation
//!
//! ```text
//! /translate <text>  -> pending = Ready(text), language menu
//! /translate         -> cached OCR text ? Ready(cached) + menu : AwaitingText + prompt
//! free text          -> AwaitingText ? Ready(text) + menu : usage hint
//! lang_xx button     -> translate pending text (or the cached OCR text), clear on success
//! cancel button      -> pending cleared
//! ```

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::utils::with_deadline;
use crate::services::language_name;
use crate::session::PendingTranslation;
use crate::telegram::outbox::{Outbox, Reply};
use crate::telegram::router::{CallbackAction, Event, Handler, HandlerContext, Request};
use crate::telegram::texts;

async fn offer_languages(ctx: &HandlerContext, req: &Request, text: String, out: &dyn Outbox) -> AppResult<()> {
    ctx.sessions
        .set_pending(req.user_id, PendingTranslation::Ready(text))
        .await;
    out.send(Reply::plain(texts::CHOOSE_LANGUAGE).with_keyboard(texts::language_keyboard()))
        .await
}

pub struct TranslateCommandHandler;

#[async_trait]
impl Handler for TranslateCommandHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        let inline = match &req.event {
            Event::Translate { text } => text.trim(),
            _ => "",
        };

        if !inline.is_empty() {
            return offer_languages(ctx, req, inline.to_string(), out).await;
        }

        if let Some(cached) = ctx.sessions.last_text(req.user_id).await {
            return offer_languages(ctx, req, cached, out).await;
        }

        ctx.sessions
            .set_pending(req.user_id, PendingTranslation::AwaitingText)
            .await;
        out.send(Reply::plain(texts::SEND_TEXT_TO_TRANSLATE)).await
    }
}

/// Plain text messages: the answer to "send me the text", anything else gets a hint.
pub struct TextHandler;

#[async_trait]
impl Handler for TextHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        let Event::Text(text) = &req.event else {
            return Ok(());
        };
        let text = text.trim();

        let awaiting = matches!(
            ctx.sessions.get(req.user_id).await.pending,
            Some(PendingTranslation::AwaitingText)
        );
        if awaiting && !text.is_empty() {
            return offer_languages(ctx, req, text.to_string(), out).await;
        }

        out.send(Reply::plain(texts::TEXT_HINT)).await
    }
}

/// A language button from the menu.
pub struct LanguageHandler;

#[async_trait]
impl Handler for LanguageHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        let Event::Callback(CallbackAction::Language(code)) = &req.event else {
            return Ok(());
        };
        let Some(language) = language_name(code) else {
            return out.send(Reply::plain(texts::UNSUPPORTED_LANGUAGE)).await;
        };

        // Pending state is cleared only after a successful translation, so a
        // timed-out or failed attempt can be retried from the same menu.
        let pending = ctx.sessions.get(req.user_id).await.pending;
        let source = match &pending {
            Some(PendingTranslation::Ready(text)) => Some(text.clone()),
            _ => ctx.sessions.last_text(req.user_id).await,
        };
        let Some(source) = source else {
            return out.send(Reply::plain(texts::NOTHING_TO_TRANSLATE)).await;
        };

        out.send(Reply::plain(texts::translating_to(language))).await?;

        let translated = with_deadline(
            "translation",
            ctx.deadlines.translate,
            ctx.translator.translate(&source, code),
        )
        .await?;
        ctx.sessions
            .update(req.user_id, move |session| {
                if session.pending == pending {
                    session.pending = None;
                }
            })
            .await;
        log::info!(
            "Translated {} chars to {} for user {}",
            source.chars().count(),
            code,
            req.user_id.0
        );

        out.send(Reply::markdown(texts::translation(language, &translated))).await
    }
}

pub struct CancelHandler;

#[async_trait]
impl Handler for CancelHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        ctx.sessions.take_pending(req.user_id).await;
        out.send(Reply::plain(texts::TRANSLATION_CANCELLED)).await
    }
}
