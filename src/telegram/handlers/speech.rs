use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::utils::with_deadline;
use crate::telegram::outbox::{Outbox, Reply};
use crate::telegram::router::{Handler, HandlerContext, Request};
use crate::telegram::texts;

/// /tts: speaks the user's last extracted text.
pub struct SpeechHandler;

#[async_trait]
impl Handler for SpeechHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        let Some(text) = ctx.sessions.last_text(req.user_id).await else {
            return out.send(Reply::plain(texts::NO_CACHED_TEXT)).await;
        };

        out.send(Reply::plain(texts::CONVERTING_TO_SPEECH)).await?;

        let audio = with_deadline(
            "speech synthesis",
            ctx.deadlines.tts,
            ctx.speech.synthesize(&text, &ctx.tts_language),
        )
        .await?;

        out.send(Reply::Audio {
            data: audio,
            file_name: texts::SPEECH_FILE_NAME.to_string(),
            title: Some(texts::SPEECH_TITLE.to_string()),
        })
        .await
    }
}
