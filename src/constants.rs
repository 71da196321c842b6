// ABOUTME: Constants re-exported from the recipe-core foundation crate
// ABOUTME: Tier quotas, recipe defaults, suggestion bounds, and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::constants::*;
