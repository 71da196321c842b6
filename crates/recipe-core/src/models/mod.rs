// ABOUTME: Core data models for the recipe assistant
// ABOUTME: Re-exports Recipe, ConversationMessage, SubscriptionTier, and usage types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `Recipe`: strongly typed output of AI recipe generation
//! - `ConversationMessage` / `ConversationState`: one user's chat session
//! - `SubscriptionTier`: static quota table per plan
//! - `UsageRecord` / `QuotaCheck`: monthly usage counters and quota decisions

mod conversation;
mod recipe;
mod tier;
mod usage;

pub use conversation::{ConversationMessage, ConversationState, MessageRole};
pub use recipe::{MealCategory, Recipe};
pub use tier::SubscriptionTier;
pub use usage::{QuotaCheck, UsageField, UsageRecord};
