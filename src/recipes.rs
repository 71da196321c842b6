// ABOUTME: Turns loosely structured model output into a validated, fully defaulted Recipe
// ABOUTME: Extracts the JSON object, enforces required fields, and applies recipe defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe Construction
//!
//! Model output is parsed into an untyped `serde_json::Value` first and
//! then validated field by field. The untyped shape never leaves this
//! module: callers get a [`Recipe`] or a `GENERATION_FAILED` error.
//!
//! `title`, `ingredients`, and `instructions` are required. Everything else
//! falls back to a default when absent or malformed.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::constants::recipe_defaults::{COOK_TIME_MINUTES, SERVINGS};
use crate::errors::{AppError, AppResult};
use crate::models::{MealCategory, Recipe};

/// Parse raw model text into a recipe
///
/// # Errors
///
/// Returns `GENERATION_FAILED` when no JSON object can be found in the text
/// or a required field is missing or empty
pub fn parse_recipe_response(raw: &str) -> AppResult<Recipe> {
    let value = extract_json_object(raw)?;
    recipe_from_value(&value)
}

/// Validate and default an already parsed JSON object
///
/// # Errors
///
/// Returns `GENERATION_FAILED` if the value is not an object or a required
/// field is missing or empty
pub fn recipe_from_value(value: &Value) -> AppResult<Recipe> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::generation("AI response is not a JSON object"))?;

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| missing("title"))?
        .to_owned();

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .map(|d| d.trim().to_owned())
        .unwrap_or_default();

    let ingredients = string_list(object, "ingredients")?;
    let instructions = string_list(object, "instructions")?;

    let cook_time = positive_integer(object.get("cookTime")).unwrap_or(COOK_TIME_MINUTES);
    let servings = positive_integer(object.get("servings")).unwrap_or(SERVINGS);

    let category = object
        .get("category")
        .and_then(Value::as_str)
        .and_then(MealCategory::from_model_value)
        .unwrap_or_default();

    Ok(Recipe {
        title,
        description,
        ingredients,
        instructions,
        cook_time,
        servings,
        category,
    })
}

fn missing(field: &str) -> AppError {
    AppError::generation(format!("AI response is missing required field '{field}'"))
        .with_details(json!({ "field": field }))
}

/// Required list of non-empty strings; non-string or blank entries are dropped
fn string_list(object: &Map<String, Value>, field: &str) -> AppResult<Vec<String>> {
    let items: Vec<String> = object
        .get(field)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        return Err(missing(field));
    }
    Ok(items)
}

/// Accepts a JSON number or a numeric string; zero, negative, and
/// out-of-range values yield `None`
fn positive_integer(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number < 1.0 || number > f64::from(u32::MAX) {
        return None;
    }
    Some(number.round() as u32)
}

/// Locate the JSON object in model text
///
/// Tries, in order: the whole text, the text inside a markdown code fence,
/// and the span from the first `{` to the last `}`.
fn extract_json_object(raw: &str) -> AppResult<Value> {
    let trimmed = raw.trim();

    let candidates = [Some(trimmed), strip_code_fence(trimmed), outermost_braces(trimmed)];
    for candidate in candidates.into_iter().flatten() {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    warn!(
        response_chars = raw.chars().count(),
        "AI response did not contain a JSON object"
    );
    Err(AppError::generation(
        "AI response could not be parsed as a recipe",
    ))
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_open = &text[start + 3..];
    // Skip an optional language tag on the opening fence line
    let body_start = after_open.find('\n').map_or(0, |i| i + 1);
    let body = &after_open[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
