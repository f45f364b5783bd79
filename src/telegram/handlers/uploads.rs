//! Photo uploads: download, recognize, cache and echo the text

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::utils::with_deadline;
use crate::telegram::outbox::{Outbox, Reply};
use crate::telegram::router::{Event, Handler, HandlerContext, PhotoRendition, Request};
use crate::telegram::texts;

/// The rendition with the most pixels; Telegram usually lists it last.
pub fn largest_rendition(renditions: &[PhotoRendition]) -> Option<&PhotoRendition> {
    renditions
        .iter()
        .max_by_key(|r| u64::from(r.width) * u64::from(r.height))
}

pub struct PhotoHandler;

#[async_trait]
impl Handler for PhotoHandler {
    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        let renditions: &[PhotoRendition] = match &req.event {
            Event::Photo { renditions } => renditions.as_slice(),
            _ => &[],
        };
        let Some(photo) = largest_rendition(renditions) else {
            return out.send(Reply::plain(texts::SEND_VALID_IMAGE)).await;
        };

        out.send(Reply::plain(texts::WAIT_EXTRACTING)).await?;

        let image = with_deadline("photo download", ctx.deadlines.download, ctx.files.download(&photo.file_id)).await?;
        log::info!(
            "Downloaded {}x{} photo ({} bytes) from user {}",
            photo.width,
            photo.height,
            image.len(),
            req.user_id.0
        );

        let text = with_deadline("text recognition", ctx.deadlines.ocr, ctx.ocr.recognize(&image)).await?;
        if text.trim().is_empty() {
            return out.send(Reply::plain(texts::NO_TEXT_DETECTED)).await;
        }

        let reply = texts::extracted_text(&text);
        ctx.sessions.store_text(req.user_id, text).await;
        out.send(Reply::markdown(reply)).await
    }
}
