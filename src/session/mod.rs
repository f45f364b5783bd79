//! Per-user session state kept in process memory
//!
//! One record per user holds the verification flag, the most recent OCR text
//! and the translation conversation state. Records are evicted after an idle
//! period or when the store reaches its capacity.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::notification::RemovalCause;
use teloxide::types::UserId;

use crate::core::config;

/// Where a user is in the /translate conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingTranslation {
    /// The next plain text message is the text to translate.
    AwaitingText,
    /// Language menu shown for this text.
    Ready(String),
}

/// State record of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub verified: bool,
    pub last_text: Option<String>,
    pub pending: Option<PendingTranslation>,
}

/// Concurrent session store keyed by user id.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<UserId, Session>,
}

impl SessionStore {
    /// Creates a store bounded by `max_capacity` entries, evicting sessions idle for `idle_ttl`.
    pub fn new(max_capacity: u64, idle_ttl: Duration) -> Self {
        let cache = Cache::<UserId, Session>::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle_ttl)
            .eviction_listener(|user_id: Arc<UserId>, _session: Session, cause: RemovalCause| {
                log::debug!("Session of user {} evicted: {:?}", user_id.0, cause);
            })
            .build();
        Self { cache }
    }

    /// Creates a store using SESSION_MAX_CAPACITY and SESSION_IDLE_TTL_SECS.
    pub fn from_config() -> Self {
        Self::new(*config::session::MAX_CAPACITY, config::session::idle_ttl())
    }

    /// Returns a snapshot of the user's session (default when absent).
    pub async fn get(&self, user_id: UserId) -> Session {
        self.cache.get(&user_id).await.unwrap_or_default()
    }

    /// Applies `f` to the user's session atomically and returns the updated record.
    pub async fn update<F>(&self, user_id: UserId, f: F) -> Session
    where
        F: FnOnce(&mut Session) + Send,
    {
        let entry = self
            .cache
            .entry(user_id)
            .and_upsert_with(|existing| {
                let mut session = existing.map(|e| e.into_value()).unwrap_or_default();
                f(&mut session);
                std::future::ready(session)
            })
            .await;
        entry.into_value()
    }

    pub async fn is_verified(&self, user_id: UserId) -> bool {
        self.cache.get(&user_id).await.map(|s| s.verified).unwrap_or(false)
    }

    pub async fn mark_verified(&self, user_id: UserId) {
        self.update(user_id, |s| s.verified = true).await;
    }

    pub async fn last_text(&self, user_id: UserId) -> Option<String> {
        self.cache.get(&user_id).await.and_then(|s| s.last_text)
    }

    /// Replaces the user's last extracted text.
    pub async fn store_text(&self, user_id: UserId, text: String) {
        self.update(user_id, move |s| s.last_text = Some(text)).await;
    }

    pub async fn set_pending(&self, user_id: UserId, pending: PendingTranslation) {
        self.update(user_id, move |s| s.pending = Some(pending)).await;
    }

    /// Removes and returns the pending translation state.
    pub async fn take_pending(&self, user_id: UserId) -> Option<PendingTranslation> {
        let mut taken = None;
        self.update(user_id, |s| taken = s.pending.take()).await;
        taken
    }

    /// Number of live sessions, after flushing pending maintenance.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config()
    }
}
