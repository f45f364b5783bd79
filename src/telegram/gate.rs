//! Verification gate and the join flow shared by /start and the "I Have Joined" button

use teloxide::types::UserId;

use super::outbox::{Outbox, Reply};
use super::router::HandlerContext;
use super::texts;
use crate::core::error::AppResult;
use crate::services::{check_membership, MembershipStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// The user got the join flow instead of the requested action.
    Redirected,
}

/// How the join flow was entered; decides the wording of the replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinTrigger {
    /// `/start`, or any protected action by an unverified user.
    Start,
    /// The "I Have Joined" button.
    Button,
}

/// Lets verified users through and runs the join flow for everyone else.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationGate;

impl VerificationGate {
    pub async fn admit(&self, ctx: &HandlerContext, user_id: UserId, out: &dyn Outbox) -> AppResult<Admission> {
        if ctx.sessions.is_verified(user_id).await {
            return Ok(Admission::Admitted);
        }

        // the requested action is not replayed, even when this check verifies the user
        join_flow(ctx, user_id, out, JoinTrigger::Start).await?;
        Ok(Admission::Redirected)
    }
}

/// Checks membership once and answers with the intro, the join prompt or a retry notice.
pub async fn join_flow(
    ctx: &HandlerContext,
    user_id: UserId,
    out: &dyn Outbox,
    trigger: JoinTrigger,
) -> AppResult<MembershipStatus> {
    let status = check_membership(ctx.membership.as_ref(), &ctx.chats, user_id, ctx.deadlines.membership).await;
    log::info!("Membership of user {} ({:?}): {:?}", user_id.0, trigger, status);

    match &status {
        MembershipStatus::Verified => {
            ctx.sessions.mark_verified(user_id).await;
            if trigger == JoinTrigger::Button {
                out.send(Reply::plain(texts::VERIFICATION_SUCCESS)).await?;
            }
            out.send(Reply::markdown(texts::intro())).await?;
        }
        MembershipStatus::NotMember => {
            let reply = match trigger {
                JoinTrigger::Start => Reply::markdown(texts::join_prompt()),
                JoinTrigger::Button => Reply::plain(texts::NOT_JOINED_YET),
            };
            out.send(reply.with_keyboard(texts::join_keyboard(&ctx.chats))).await?;
        }
        MembershipStatus::CheckFailed(_) => {
            out.send(Reply::plain(texts::CHECK_FAILED).with_keyboard(texts::join_keyboard(&ctx.chats)))
                .await?;
        }
    }

    Ok(status)
}
