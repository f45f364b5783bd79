//! Membership oracle: is the user in both required chats?

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, UserId};

use super::MembershipOracle;
use crate::core::config::RequiredChats;
use crate::core::error::AppResult;
use crate::core::utils::with_deadline;

/// Outcome of checking a user against the required chats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipStatus {
    /// Member of both chats.
    Verified,
    /// Definitely missing from at least one chat.
    NotMember,
    /// The lookup itself failed; the answer is unknown and worth retrying.
    CheckFailed(String),
}

/// Owner, administrator and plain member count as present.
pub fn counts_as_member(status: ChatMemberStatus) -> bool {
    matches!(
        status,
        ChatMemberStatus::Owner | ChatMemberStatus::Administrator | ChatMemberStatus::Member
    )
}

/// Looks the user up in the channel and the group concurrently and reduces both answers.
///
/// A definite "not a member" from either chat wins over a failed lookup in the other.
pub async fn check_membership(
    oracle: &dyn MembershipOracle,
    chats: &RequiredChats,
    user_id: UserId,
    deadline: Duration,
) -> MembershipStatus {
    let (channel, group) = tokio::join!(
        with_deadline("channel membership lookup", deadline, oracle.is_member(chats.channel_id, user_id)),
        with_deadline("group membership lookup", deadline, oracle.is_member(chats.group_id, user_id)),
    );

    match (channel, group) {
        (Ok(true), Ok(true)) => MembershipStatus::Verified,
        (Ok(false), _) | (_, Ok(false)) => MembershipStatus::NotMember,
        (Err(e), _) | (_, Err(e)) => {
            log::warn!("Membership check for user {} failed: {}", user_id.0, e);
            MembershipStatus::CheckFailed(e.to_string())
        }
    }
}

/// Oracle backed by the Bot API `getChatMember` call.
///
/// The bot must be an administrator of the channel to see its members.
#[derive(Clone)]
pub struct TelegramMembership {
    bot: Bot,
}

impl TelegramMembership {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MembershipOracle for TelegramMembership {
    async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let status = member.kind.status();
        log::debug!("User {} in chat {}: {:?}", user_id.0, chat_id, status);
        Ok(counts_as_member(status))
    }
}
