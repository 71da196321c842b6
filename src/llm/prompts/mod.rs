// ABOUTME: System prompts for recipe chat and recipe generation loaded at compile time
// ABOUTME: Builds the combined generation instruction from a prompt and recent conversation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

use std::fmt::Write;

use crate::models::{ConversationMessage, MessageRole};

/// Chat system instruction: keep conversational context, format lists with hyphens
pub const RECIPE_CHAT_SYSTEM_PROMPT: &str = include_str!("recipe_chat_system.md");

/// Recipe generation instruction describing the JSON contract
pub const RECIPE_GENERATION_PROMPT: &str = include_str!("recipe_generation.md");

/// Get the system prompt for assistant chat
#[must_use]
pub const fn get_chat_system_prompt() -> &'static str {
    RECIPE_CHAT_SYSTEM_PROMPT
}

/// Combine the generation instruction, recent context, and the user's request
///
/// Context messages are rendered in their original order.
#[must_use]
pub fn build_generation_prompt(prompt: &str, context: &[ConversationMessage]) -> String {
    let mut combined = String::from(RECIPE_GENERATION_PROMPT);

    if !context.is_empty() {
        combined.push_str("\nRecent conversation:\n");
        for message in context {
            let speaker = match message.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            // Writing to a String cannot fail
            let _ = writeln!(combined, "{speaker}: {}", message.content);
        }
    }

    let _ = write!(combined, "\nRequest: {}", prompt.trim());
    combined
}
