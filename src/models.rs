// ABOUTME: Domain models re-exported from the recipe-core foundation crate
// ABOUTME: Recipes, conversations, subscription tiers, and usage records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::models::*;
