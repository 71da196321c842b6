// ABOUTME: In-memory usage ledger backed by a sharded concurrent map
// ABOUTME: Suitable for single-process deployments and tests, counters are lost on restart
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{UsageLedger, UsageMonth};
use crate::errors::AppResult;
use crate::models::{UsageField, UsageRecord};

/// In-memory usage ledger
///
/// Uses `DashMap` for fine-grained locking; an increment holds the shard
/// write lock for the whole read-modify-write.
#[derive(Clone, Default)]
pub struct InMemoryUsageLedger {
    records: Arc<DashMap<(String, UsageMonth), UsageRecord>>,
}

impl InMemoryUsageLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a record, for seeding fixtures and imports
    pub fn set_usage(&self, user_id: &str, month: UsageMonth, record: UsageRecord) {
        self.records.insert((user_id.to_owned(), month), record);
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn get_usage(&self, user_id: &str, month: UsageMonth) -> AppResult<UsageRecord> {
        Ok(self
            .records
            .get(&(user_id.to_owned(), month))
            .map(|entry| *entry)
            .unwrap_or_default())
    }

    async fn increment(
        &self,
        user_id: &str,
        month: UsageMonth,
        field: UsageField,
    ) -> AppResult<()> {
        let mut entry = self
            .records
            .entry((user_id.to_owned(), month))
            .or_default();
        let counter = match field {
            UsageField::RecipeQueries => &mut entry.recipe_queries,
            UsageField::RecipesGenerated => &mut entry.recipes_generated,
        };
        *counter = counter.saturating_add(1);
        Ok(())
    }
}
