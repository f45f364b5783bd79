//! /start, /help and the "I Have Joined" button

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::telegram::gate::{join_flow, JoinTrigger};
use crate::telegram::outbox::{Outbox, Reply};
use crate::telegram::router::{Handler, HandlerContext, Request};
use crate::telegram::texts;

/// Intro for verified users, membership check for everyone else.
pub struct StartHandler;

#[async_trait]
impl Handler for StartHandler {
    fn protected(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        if ctx.sessions.is_verified(req.user_id).await {
            return out.send(Reply::markdown(texts::intro())).await;
        }
        join_flow(ctx, req.user_id, out, JoinTrigger::Start).await?;
        Ok(())
    }
}

pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, _ctx: &HandlerContext, _req: &Request, out: &dyn Outbox) -> AppResult<()> {
        out.send(Reply::markdown(texts::help())).await
    }
}

/// Re-checks membership on demand; already verified users skip the lookup.
pub struct VerifyHandler;

#[async_trait]
impl Handler for VerifyHandler {
    fn protected(&self) -> bool {
        false
    }

    async fn handle(&self, ctx: &HandlerContext, req: &Request, out: &dyn Outbox) -> AppResult<()> {
        if ctx.sessions.is_verified(req.user_id).await {
            out.send(Reply::plain(texts::VERIFICATION_SUCCESS)).await?;
            return out.send(Reply::markdown(texts::intro())).await;
        }
        join_flow(ctx, req.user_id, out, JoinTrigger::Button).await?;
        Ok(())
    }
}
