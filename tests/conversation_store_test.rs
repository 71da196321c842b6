// ABOUTME: Integration tests for the conversation store backends
// ABOUTME: Covers welcome seeding, append order, suggestions, clear, and session expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{create_memory_database, create_test_database};
use recipe_ai_server::{
    config::ConversationConfig,
    constants::conversation::WELCOME_MESSAGE,
    conversation::{ConversationStore, InMemoryConversationStore, SqliteConversationStore},
    models::{ConversationMessage, MealCategory, MessageRole, Recipe},
};

fn memory_store() -> InMemoryConversationStore {
    InMemoryConversationStore::new(ConversationConfig::default())
}

fn sample_recipe() -> Recipe {
    Recipe {
        title: "Tomato Soup".to_owned(),
        description: "Simple and warm".to_owned(),
        ingredients: vec!["tomatoes".to_owned(), "stock".to_owned()],
        instructions: vec!["Simmer".to_owned(), "Blend".to_owned()],
        cook_time: 25,
        servings: 2,
        category: MealCategory::Lunch,
    }
}

// ============================================================================
// Shared contract checks
// ============================================================================

async fn assert_seeding_is_idempotent(store: &dyn ConversationStore) {
    let first = store.get_conversation("new-user").await.unwrap();
    let second = store.get_conversation("new-user").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.messages.len(), 1);
    assert_eq!(first.messages[0].role, MessageRole::Assistant);
    assert_eq!(first.messages[0].content, WELCOME_MESSAGE);
    assert!(first.suggestions.is_empty());
}

async fn assert_append_preserves_order(store: &dyn ConversationStore) {
    store
        .append_turn(
            "chatty",
            &[
                ConversationMessage::user("What's for lunch?"),
                ConversationMessage::assistant("- Tomato Soup"),
            ],
        )
        .await
        .unwrap();
    store
        .append_turn(
            "chatty",
            &[
                ConversationMessage::user("Make the soup"),
                ConversationMessage::assistant_with_recipe("Here it is", sample_recipe()),
            ],
        )
        .await
        .unwrap();

    let state = store.get_conversation("chatty").await.unwrap();
    let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            WELCOME_MESSAGE,
            "What's for lunch?",
            "- Tomato Soup",
            "Make the soup",
            "Here it is",
        ]
    );
    assert_eq!(state.messages[4].recipe, Some(sample_recipe()));
    assert!(state.messages[3].recipe.is_none());
}

async fn assert_suggestions_are_replaced(store: &dyn ConversationStore) {
    store
        .set_suggestions("picky", &["Ramen".to_owned(), "Udon".to_owned()])
        .await
        .unwrap();
    store
        .set_suggestions("picky", &["Soba Noodles".to_owned()])
        .await
        .unwrap();

    let state = store.get_conversation("picky").await.unwrap();
    assert_eq!(state.suggestions, vec!["Soba Noodles"]);
    assert_eq!(state.messages.len(), 1);
}

async fn assert_clear_does_not_reseed(store: &dyn ConversationStore) {
    store
        .append_turn("leaver", &[ConversationMessage::user("hello")])
        .await
        .unwrap();
    store
        .set_suggestions("leaver", &["Fried Rice".to_owned()])
        .await
        .unwrap();

    store.clear("leaver").await.unwrap();

    let state = store.get_conversation("leaver").await.unwrap();
    assert!(state.messages.is_empty());
    assert!(state.suggestions.is_empty());

    store
        .append_turn("leaver", &[ConversationMessage::user("back again")])
        .await
        .unwrap();
    let state = store.get_conversation("leaver").await.unwrap();
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].content, "back again");
}

async fn assert_users_are_isolated(store: &dyn ConversationStore) {
    store
        .append_turn("alice", &[ConversationMessage::user("alice's message")])
        .await
        .unwrap();

    let bob = store.get_conversation("bob").await.unwrap();
    assert_eq!(bob.messages.len(), 1);
    assert_eq!(bob.messages[0].content, WELCOME_MESSAGE);
}

// ============================================================================
// In-memory store
// ============================================================================

#[tokio::test]
async fn test_memory_seeding_is_idempotent() {
    assert_seeding_is_idempotent(&memory_store()).await;
}

#[tokio::test]
async fn test_memory_append_preserves_order() {
    assert_append_preserves_order(&memory_store()).await;
}

#[tokio::test]
async fn test_memory_suggestions_are_replaced() {
    assert_suggestions_are_replaced(&memory_store()).await;
}

#[tokio::test]
async fn test_memory_clear_does_not_reseed() {
    assert_clear_does_not_reseed(&memory_store()).await;
}

#[tokio::test]
async fn test_memory_users_are_isolated() {
    assert_users_are_isolated(&memory_store()).await;
}

#[tokio::test]
async fn test_memory_expired_session_starts_over() {
    let store = InMemoryConversationStore::new(ConversationConfig {
        ttl: Duration::from_millis(50),
        max_sessions: 10,
    });
    store
        .append_turn("sleepy", &[ConversationMessage::user("remember me")])
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;

    let state = store.get_conversation("sleepy").await.unwrap();
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].content, WELCOME_MESSAGE);
}

#[tokio::test]
async fn test_memory_purge_drops_only_expired_sessions() {
    let store = InMemoryConversationStore::new(ConversationConfig {
        ttl: Duration::from_millis(50),
        max_sessions: 10,
    });
    store.get_conversation("old-1").await.unwrap();
    store.get_conversation("old-2").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    store.get_conversation("fresh").await.unwrap();

    assert_eq!(store.len().await, 3);
    assert_eq!(store.purge_expired().await, 2);
    assert_eq!(store.len().await, 1);
    assert_eq!(store.purge_expired().await, 0);
}

#[tokio::test]
async fn test_memory_capacity_evicts_least_recent_session() {
    let store = InMemoryConversationStore::new(ConversationConfig {
        ttl: Duration::from_secs(60),
        max_sessions: 2,
    });
    store
        .append_turn("first", &[ConversationMessage::user("one")])
        .await
        .unwrap();
    store.get_conversation("second").await.unwrap();
    store.get_conversation("third").await.unwrap();

    assert_eq!(store.len().await, 2);
    let first = store.get_conversation("first").await.unwrap();
    assert_eq!(first.messages.len(), 1);
    assert_eq!(first.messages[0].content, WELCOME_MESSAGE);
}

// ============================================================================
// SQLite store
// ============================================================================

#[tokio::test]
async fn test_sqlite_seeding_is_idempotent() {
    let database = create_memory_database().await;
    assert_seeding_is_idempotent(&SqliteConversationStore::new(&database)).await;
}

#[tokio::test]
async fn test_sqlite_append_preserves_order() {
    let database = create_memory_database().await;
    assert_append_preserves_order(&SqliteConversationStore::new(&database)).await;
}

#[tokio::test]
async fn test_sqlite_suggestions_are_replaced() {
    let database = create_memory_database().await;
    assert_suggestions_are_replaced(&SqliteConversationStore::new(&database)).await;
}

#[tokio::test]
async fn test_sqlite_clear_does_not_reseed() {
    let database = create_memory_database().await;
    assert_clear_does_not_reseed(&SqliteConversationStore::new(&database)).await;
}

#[tokio::test]
async fn test_sqlite_users_are_isolated() {
    let database = create_memory_database().await;
    assert_users_are_isolated(&SqliteConversationStore::new(&database)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_concurrent_first_access_seeds_once() {
    let (_dir, database) = create_test_database().await;
    let store = Arc::new(SqliteConversationStore::new(&database));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.get_conversation("racer").await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().messages.len(), 1);
    }

    let state = store.get_conversation("racer").await.unwrap();
    assert_eq!(state.messages.len(), 1);
}
