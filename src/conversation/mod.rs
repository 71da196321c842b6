// ABOUTME: Conversation store contract for per-user session message history
// ABOUTME: Defines the ConversationStore trait and re-exports the memory and SQLite backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Store
//!
//! Keyed by user id. A conversation is created lazily, seeded with a single
//! welcome message exactly once per session lifetime, and only ever grows
//! until it is cleared or the session expires.

mod memory;
mod sqlite;

pub use memory::InMemoryConversationStore;
pub use sqlite::SqliteConversationStore;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{ConversationMessage, ConversationState};

/// Session-scoped conversation storage
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Current conversation, seeding the welcome message if none exists
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be read or written
    async fn get_conversation(&self, user_id: &str) -> AppResult<ConversationState>;

    /// Append messages in order, without merging or deduplication
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be written
    async fn append_turn(&self, user_id: &str, messages: &[ConversationMessage]) -> AppResult<()>;

    /// Replace the suggestion list
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be written
    async fn set_suggestions(&self, user_id: &str, suggestions: &[String]) -> AppResult<()>;

    /// Reset to no messages and no suggestions
    ///
    /// The cleared conversation is not reseeded for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be written
    async fn clear(&self, user_id: &str) -> AppResult<()>;
}
