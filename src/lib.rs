// ABOUTME: Main library entry point for the recipe AI server
// ABOUTME: Usage-metered AI chat and recipe generation over pluggable stores and LLM providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe AI Server
//!
//! Backend for an AI kitchen assistant. Users chat about food, receive
//! recipe suggestions mined from the assistant's replies, and ask for
//! structured recipes that are metered against their subscription tier.
//!
//! ## Architecture
//!
//! Leaf components first:
//! - **Usage ledger**: per-user, per-month counters checked against tier quotas
//! - **Conversation store**: ordered message history plus the latest suggestions
//! - **Suggestions**: pure extraction of candidate dishes from assistant text
//! - **Gateway**: chat and recipe generation calls to an LLM provider
//! - **Chat orchestration**: sequences quota, AI, extraction, and persistence
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use recipe_ai_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Recipe AI server configured on {}", config.bind_address());
//!     Ok(())
//! }
//! ```

/// Trusted identity extraction from the fronting session layer
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// Conversation store trait and backends
pub mod conversation;

/// `SQLite` connection pool and schema
pub mod database;

/// Unified error handling
pub mod errors;

/// AI gateway over the configured LLM provider
pub mod gateway;

/// LLM provider abstraction and OpenAI-compatible implementation
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware layers
pub mod middleware;

/// Domain models
pub mod models;

/// Recipe construction from model output
pub mod recipes;

/// Shared server resources
pub mod resources;

/// HTTP routes
pub mod routes;

/// Business logic services
pub mod services;

/// Suggestion extraction from assistant text
pub mod suggestions;

/// Usage ledger trait and backends
pub mod usage;
