// ABOUTME: Core types and constants for the recipe assistant platform
// ABOUTME: Foundation crate with error handling, domain models, and quota constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Foundation crate providing shared types and constants for the recipe
//! assistant. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ErrorKind`
//! - **constants**: Tier quotas, recipe defaults, and suggestion bounds
//! - **models**: Recipes, conversation messages, subscription tiers, and usage records

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Recipe, `ConversationMessage`, `SubscriptionTier`, usage)
pub mod models;
