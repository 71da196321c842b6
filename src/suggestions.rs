// ABOUTME: Heuristic extraction of recipe and meal suggestions from assistant prose
// ABOUTME: Mines markdown list items and bold spans, then filters, deduplicates, and caps them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Suggestion Extraction
//!
//! A pure, deterministic function over assistant text. It is a best-effort
//! heuristic: false positives and negatives are acceptable, but the same
//! input always yields the same output.
//!
//! Two passes run over the text:
//! 1. Markdown list items (`- item` or a bullet glyph), with `**` removed.
//! 2. Bold spans (`**span**`) anywhere in the text.
//!
//! Candidates from both passes are merged in first-seen order, exact
//! duplicates after trimming are dropped, and the result is capped.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::constants::suggestions::{
    BOLD_SPAN_MAX_EXCLUSIVE, BOLD_SPAN_MIN_EXCLUSIVE, LIST_ITEM_MAX_EXCLUSIVE,
    LIST_ITEM_MIN_EXCLUSIVE, MAX_SUGGESTIONS,
};

/// List items containing any of these are assistant chatter, not dishes
const LIST_EXCLUDED_PHRASES: &[&str] = &[
    "what i can help",
    "speaking of food",
    "help you with:",
    "today?",
    "right now?",
];

/// List items starting with these are questions or segues
const LIST_EXCLUDED_PREFIXES: &[&str] = &["what ", "speaking "];

/// Bold spans containing any of these are headings or descriptors
const BOLD_EXCLUDED_WORDS: &[&str] = &[
    "quick",
    "minutes",
    "options",
    "ideas",
    "grab-and-go",
    "protein-packed",
    "energy-boosting",
];

/// Line-leading bullet glyphs: optional indent, a glyph, then a space
fn bullet_regex() -> Option<&'static Regex> {
    static BULLET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BULLET_REGEX
        .get_or_init(|| Regex::new(r"(?m)^([ \t]*)[•●◦▪▫‣∙·] ").ok())
        .as_ref()
}

/// Markdown list items: optional indent, a hyphen or glyph, a space, content
fn list_item_regex() -> Option<&'static Regex> {
    static LIST_ITEM_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    LIST_ITEM_REGEX
        .get_or_init(|| Regex::new(r"(?m)^[ \t]*[-•●◦▪▫‣∙·] (.+)$").ok())
        .as_ref()
}

/// Bold spans: `**` delimited, no asterisks inside
fn bold_regex() -> Option<&'static Regex> {
    static BOLD_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BOLD_REGEX
        .get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").ok())
        .as_ref()
}

/// Rewrite line-leading bullet glyphs as markdown hyphen markers
///
/// Indentation is preserved. Asterisk list markers are left alone since they
/// collide with bold markup.
#[must_use]
pub fn normalize_bullets(text: &str) -> String {
    bullet_regex().map_or_else(
        || text.to_owned(),
        |re| re.replace_all(text, "${1}- ").into_owned(),
    )
}

fn strictly_between(len: usize, min: usize, max: usize) -> bool {
    len > min && len < max
}

fn keep_list_item(candidate: &str) -> bool {
    if !strictly_between(
        candidate.chars().count(),
        LIST_ITEM_MIN_EXCLUSIVE,
        LIST_ITEM_MAX_EXCLUSIVE,
    ) {
        return false;
    }
    let lower = candidate.to_lowercase();
    !LIST_EXCLUDED_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
        && !LIST_EXCLUDED_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}

fn keep_bold_span(candidate: &str) -> bool {
    if !strictly_between(
        candidate.chars().count(),
        BOLD_SPAN_MIN_EXCLUSIVE,
        BOLD_SPAN_MAX_EXCLUSIVE,
    ) {
        return false;
    }
    let lower = candidate.to_lowercase();
    !BOLD_EXCLUDED_WORDS.iter().any(|word| lower.contains(word))
}

fn list_candidates(text: &str) -> Vec<String> {
    let Some(re) = list_item_regex() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("**", "").trim().to_owned())
        .filter(|candidate| keep_list_item(candidate))
        .collect()
}

fn bold_candidates(text: &str) -> Vec<String> {
    let Some(re) = bold_regex() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|candidate| keep_bold_span(candidate))
        .collect()
}

/// Extract up to twelve suggestions from assistant text
#[must_use]
pub fn extract(assistant_text: &str) -> Vec<String> {
    let text = normalize_bullets(assistant_text);

    let mut seen = HashSet::new();
    list_candidates(&text)
        .into_iter()
        .chain(bold_candidates(&text))
        .filter(|candidate| seen.insert(candidate.clone()))
        .take(MAX_SUGGESTIONS)
        .collect()
}
