// ABOUTME: Error handling re-exports from the recipe-core foundation crate
// ABOUTME: Gives the server crate a single errors path for AppError, ErrorCode, and ErrorKind
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::errors::*;
