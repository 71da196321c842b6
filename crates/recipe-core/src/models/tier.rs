// ABOUTME: Subscription tier definitions with their monthly recipe query quotas
// ABOUTME: Static configuration table mapping free, basic, and pro plans to limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::quotas::{BASIC_RECIPE_QUERIES, FREE_RECIPE_QUERIES};
use crate::errors::AppError;

/// Subscription plan of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// Free plan with a small monthly quota
    #[default]
    Free,
    /// Paid plan with a larger monthly quota
    Basic,
    /// Paid plan without a quota
    Pro,
}

impl SubscriptionTier {
    /// Monthly recipe query limit for this tier, `None` when unlimited
    #[must_use]
    pub const fn recipe_query_limit(&self) -> Option<u32> {
        match self {
            Self::Free => Some(FREE_RECIPE_QUERIES),
            Self::Basic => Some(BASIC_RECIPE_QUERIES),
            Self::Pro => None,
        }
    }

    /// Convert to string for storage and headers
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
        }
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            other => Err(AppError::invalid_input(format!(
                "Unknown subscription tier '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_limits() {
        assert_eq!(SubscriptionTier::Free.recipe_query_limit(), Some(5));
        assert_eq!(SubscriptionTier::Basic.recipe_query_limit(), Some(50));
        assert_eq!(SubscriptionTier::Pro.recipe_query_limit(), None);
    }

    #[test]
    fn test_tier_parsing_is_case_insensitive() {
        assert_eq!("PRO".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Pro);
        assert_eq!(" basic ".parse::<SubscriptionTier>().unwrap(), SubscriptionTier::Basic);
        assert!("enterprise".parse::<SubscriptionTier>().is_err());
    }
}
