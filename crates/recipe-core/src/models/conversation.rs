// ABOUTME: Conversation message and session state types for the recipe assistant chat
// ABOUTME: Append-only message history plus the latest extracted suggestion list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::Recipe;
use crate::constants::conversation::WELCOME_MESSAGE;

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Message produced by the assistant
    Assistant,
}

impl MessageRole {
    /// Convert to string for storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a stored role string
    #[must_use]
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// A single message in a user's conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author of the message
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Recipe snapshot, only on assistant messages produced by recipe generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

impl ConversationMessage {
    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            recipe: None,
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            recipe: None,
        }
    }

    /// Create an assistant message carrying a generated recipe
    #[must_use]
    pub fn assistant_with_recipe(content: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            recipe: Some(recipe),
        }
    }

    /// Assistant greeting used to seed a new conversation
    #[must_use]
    pub fn welcome() -> Self {
        Self::assistant(WELCOME_MESSAGE)
    }
}

/// Conversation of one authenticated user for the lifetime of their session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Messages in conversation order
    pub messages: Vec<ConversationMessage>,
    /// Suggestions extracted from the latest assistant chat response
    pub suggestions: Vec<String>,
}

impl ConversationState {
    /// Fresh state holding only the welcome message
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            messages: vec![ConversationMessage::welcome()],
            suggestions: Vec::new(),
        }
    }

    /// The last `count` messages, in their original order
    #[must_use]
    pub fn recent_messages(&self, count: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }
}
