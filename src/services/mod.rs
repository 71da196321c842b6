// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Hosts the chat orchestrator that sequences quota, AI, extraction, and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Protocol-agnostic business logic. Route handlers validate identity and
//! shape, then delegate here.

/// Chat and recipe generation orchestration
pub mod chat_orchestration;

pub use chat_orchestration::{
    ChatInput, ChatOrchestrator, ChatTurnOutcome, RecipeOutcome, UsageStats,
};
