// ABOUTME: Monthly usage counters and quota decision types
// ABOUTME: UsageRecord holds per-user per-month counters, QuotaCheck the gate result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::SubscriptionTier;
use crate::constants::quotas::UNLIMITED_SENTINEL;

/// Usage counters for one user in one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Chat turns plus generation turns this month
    pub recipe_queries: u32,
    /// Successful recipe generations this month
    pub recipes_generated: u32,
}

/// Counter selector for ledger increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageField {
    /// Counted once per chat turn and once per generation turn
    RecipeQueries,
    /// Counted once per successful generation
    RecipesGenerated,
}

impl UsageField {
    /// Column name in relational storage
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::RecipeQueries => "recipe_queries",
            Self::RecipesGenerated => "recipes_generated",
        }
    }
}

/// Result of a read-only quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    /// Whether another metered call is allowed
    pub allowed: bool,
    /// Current `recipeQueries` count for the month
    pub current: u32,
    /// Tier limit, `None` when unlimited
    pub limit: Option<u32>,
}

impl QuotaCheck {
    /// Evaluate the quota for a tier given the current counter
    #[must_use]
    pub const fn evaluate(tier: SubscriptionTier, current: u32) -> Self {
        let limit = tier.recipe_query_limit();
        let allowed = match limit {
            Some(limit) => current < limit,
            None => true,
        };
        Self {
            allowed,
            current,
            limit,
        }
    }

    /// Limit as exposed on the wire, `-1` when unlimited
    #[must_use]
    pub fn limit_value(&self) -> i64 {
        self.limit.map_or(UNLIMITED_SENTINEL, i64::from)
    }

    /// Remaining metered calls, `None` when unlimited
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        match self.limit {
            Some(limit) => Some(limit.saturating_sub(self.current)),
            None => None,
        }
    }
}
