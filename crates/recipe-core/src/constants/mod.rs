// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Tier quotas, recipe defaults, suggestion bounds, and conversation limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Monthly AI query quotas per subscription tier
pub mod quotas {
    /// Free tier monthly recipe query quota
    pub const FREE_RECIPE_QUERIES: u32 = 5;
    /// Basic tier monthly recipe query quota
    pub const BASIC_RECIPE_QUERIES: u32 = 50;
    /// Wire sentinel for an unlimited quota
    pub const UNLIMITED_SENTINEL: i64 = -1;
}

/// Defaults applied when the model omits optional recipe fields
pub mod recipe_defaults {
    /// Default cook time in minutes
    pub const COOK_TIME_MINUTES: u32 = 30;
    /// Default number of servings
    pub const SERVINGS: u32 = 4;
}

/// Bounds for heuristic suggestion extraction
pub mod suggestions {
    /// Maximum number of suggestions kept per assistant response
    pub const MAX_SUGGESTIONS: usize = 12;
    /// List items must be strictly longer than this many characters
    pub const LIST_ITEM_MIN_EXCLUSIVE: usize = 5;
    /// List items must be strictly shorter than this many characters
    pub const LIST_ITEM_MAX_EXCLUSIVE: usize = 100;
    /// Bold spans must be strictly longer than this many characters
    pub const BOLD_SPAN_MIN_EXCLUSIVE: usize = 3;
    /// Bold spans must be strictly shorter than this many characters
    pub const BOLD_SPAN_MAX_EXCLUSIVE: usize = 50;
}

/// Conversation limits
pub mod conversation {
    /// Maximum length of a user-authored message, in characters
    pub const MAX_USER_MESSAGE_CHARS: usize = 1000;
    /// Number of trailing messages sent as context for recipe generation
    pub const RECIPE_CONTEXT_MESSAGES: usize = 4;
    /// Assistant greeting seeded into every new conversation
    pub const WELCOME_MESSAGE: &str = "Hi! I'm your kitchen assistant. Tell me what you're \
        craving, what's in your fridge, or what kind of meal you're planning, and I'll \
        suggest recipes or create one for you.";
}

/// Service identity used in logs and health responses
pub mod service_names {
    /// Server binary name
    pub const RECIPE_AI_SERVER: &str = "recipe-ai-server";
}
