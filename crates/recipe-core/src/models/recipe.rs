// ABOUTME: Strongly typed recipe produced by AI recipe generation
// ABOUTME: Defines Recipe and MealCategory with the defaults applied to model output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::recipe_defaults::{COOK_TIME_MINUTES, SERVINGS};

/// Meal slot a recipe belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    #[default]
    Dinner,
    /// Between-meal snacks
    Snacks,
}

impl MealCategory {
    /// Interpret a category string produced by the model
    ///
    /// Matching is case-insensitive and accepts the singular `snack`.
    /// Returns `None` for anything else so the caller can apply the default.
    #[must_use]
    pub fn from_model_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snacks" | "snack" => Some(Self::Snacks),
            _ => None,
        }
    }
}

/// A generated recipe
///
/// Every field is present and type-correct once constructed; the generation
/// step fills `cook_time`, `servings`, and `category` with defaults when the
/// model leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Recipe name, never empty
    pub title: String,
    /// Short description, may be empty
    #[serde(default)]
    pub description: String,
    /// Ingredient lines in order, at least one
    pub ingredients: Vec<String>,
    /// Instruction steps in order, at least one
    pub instructions: Vec<String>,
    /// Cook time in minutes
    #[serde(default = "default_cook_time")]
    pub cook_time: u32,
    /// Number of servings
    #[serde(default = "default_servings")]
    pub servings: u32,
    /// Meal slot
    #[serde(default)]
    pub category: MealCategory,
}

const fn default_cook_time() -> u32 {
    COOK_TIME_MINUTES
}

const fn default_servings() -> u32 {
    SERVINGS
}
