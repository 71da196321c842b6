// ABOUTME: In-memory conversation store with LRU eviction and idle-session expiry
// ABOUTME: Models web-session lifetime for single-process deployments and tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

use super::ConversationStore;
use crate::config::ConversationConfig;
use crate::errors::AppResult;
use crate::models::{ConversationMessage, ConversationState};

/// Stored conversation with its expiry deadline
#[derive(Debug, Clone)]
struct SessionEntry {
    state: ConversationState,
    expires_at: Instant,
}

impl SessionEntry {
    fn new(state: ConversationState, ttl: Duration) -> Self {
        Self {
            state,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn touch(&mut self, ttl: Duration) {
        self.expires_at = Instant::now() + ttl;
    }
}

/// In-memory conversation store
///
/// `LruCache` bounds the number of live sessions; the least recently used
/// session is dropped when the capacity is reached. Each access extends the
/// session by the configured TTL.
#[derive(Clone)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<LruCache<String, SessionEntry>>>,
    ttl: Duration,
}

impl InMemoryConversationStore {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10_000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a store with the given session limits
    #[must_use]
    pub fn new(config: ConversationConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_sessions).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            sessions: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl: config.ttl,
        }
    }

    /// Run `mutate` against the live session for `user_id`, seeding it first
    /// when missing or expired. Holds the write lock for the whole call.
    async fn with_session<T>(
        &self,
        user_id: &str,
        mutate: impl FnOnce(&mut ConversationState) -> T + Send,
    ) -> T {
        let mut sessions = self.sessions.write().await;

        if sessions.get(user_id).is_some_and(SessionEntry::is_expired) {
            sessions.pop(user_id);
        }

        let ttl = self.ttl;
        let entry = sessions.get_or_insert_mut(user_id.to_owned(), || {
            debug!(user_id, "Seeding new conversation");
            SessionEntry::new(ConversationState::seeded(), ttl)
        });
        entry.touch(ttl);
        mutate(&mut entry.state)
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            sessions.pop(key);
        }
        drop(sessions);

        if !expired.is_empty() {
            debug!("Purged {} expired conversations", expired.len());
        }
        expired.len()
    }

    /// Number of sessions currently held, expired or not
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are held
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_conversation(&self, user_id: &str) -> AppResult<ConversationState> {
        Ok(self.with_session(user_id, |state| state.clone()).await)
    }

    async fn append_turn(&self, user_id: &str, messages: &[ConversationMessage]) -> AppResult<()> {
        self.with_session(user_id, |state| {
            state.messages.extend_from_slice(messages);
        })
        .await;
        Ok(())
    }

    async fn set_suggestions(&self, user_id: &str, suggestions: &[String]) -> AppResult<()> {
        self.with_session(user_id, |state| {
            state.suggestions = suggestions.to_vec();
        })
        .await;
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> AppResult<()> {
        self.sessions.write().await.put(
            user_id.to_owned(),
            SessionEntry::new(ConversationState::default(), self.ttl),
        );
        Ok(())
    }
}
