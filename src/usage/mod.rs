// ABOUTME: Usage ledger contract for per-user, per-month AI query counters
// ABOUTME: Defines the UsageLedger trait, the UsageMonth key, and the backend implementations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Usage Ledger
//!
//! Counts AI invocations per user and calendar month and answers quota
//! questions against the static tier table. Every backend must make
//! [`UsageLedger::increment`] a single atomic read-modify-write so that
//! concurrent requests from one user never lose an update.

mod memory;
mod sqlite;

pub use memory::InMemoryUsageLedger;
pub use sqlite::SqliteUsageLedger;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::errors::{AppError, AppResult};
use crate::models::{QuotaCheck, SubscriptionTier, UsageField, UsageRecord};

// ============================================================================
// Month Key
// ============================================================================

/// Calendar month a usage record belongs to, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UsageMonth {
    year: i32,
    month: u32,
}

impl UsageMonth {
    /// Month containing the given instant (UTC)
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Month containing the current instant
    #[must_use]
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Calendar year
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, 1 through 12
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The month after this one
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First instant of this month, midnight UTC on the 1st
    #[must_use]
    pub fn start(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Instant at which this month's counters stop applying
    #[must_use]
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.next().start()
    }

    /// `reset_at` as RFC 3339, empty when the date is out of range
    #[must_use]
    pub fn reset_at_rfc3339(&self) -> String {
        self.reset_at()
            .map(|at| at.to_rfc3339())
            .unwrap_or_default()
    }
}

impl fmt::Display for UsageMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for UsageMonth {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        let invalid = || AppError::invalid_input(format!("Invalid month '{s}', expected YYYY-MM"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

// ============================================================================
// Ledger Contract
// ============================================================================

/// Per-user, per-month usage counters
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Read the record for `(user_id, month)`, zero-valued when none exists
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be read
    async fn get_usage(&self, user_id: &str, month: UsageMonth) -> AppResult<UsageRecord>;

    /// Add one to `field`, creating the record on first use
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be written
    async fn increment(&self, user_id: &str, month: UsageMonth, field: UsageField)
        -> AppResult<()>;

    /// Read-only quota decision for the tier
    ///
    /// A read failure is returned as an error rather than treated as allowed.
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend cannot be read
    async fn check_quota(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
        month: UsageMonth,
    ) -> AppResult<QuotaCheck> {
        let usage = self.get_usage(user_id, month).await?;
        Ok(QuotaCheck::evaluate(tier, usage.recipe_queries))
    }
}
