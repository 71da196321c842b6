// ABOUTME: SQLite-backed usage ledger with single-statement atomic increments
// ABOUTME: Upserts (user_id, month) rows so concurrent increments never lose updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::{UsageLedger, UsageMonth};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{UsageField, UsageRecord};

/// Durable usage ledger stored in the `recipe_usage` table
#[derive(Clone)]
pub struct SqliteUsageLedger {
    pool: SqlitePool,
}

impl SqliteUsageLedger {
    /// Create a ledger over an initialized database
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }
}

/// Counters are stored as signed integers; negative values never occur but
/// are clamped rather than trusted.
fn counter(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl UsageLedger for SqliteUsageLedger {
    async fn get_usage(&self, user_id: &str, month: UsageMonth) -> AppResult<UsageRecord> {
        let row = sqlx::query(
            r"
            SELECT recipe_queries, recipes_generated
            FROM recipe_usage
            WHERE user_id = $1 AND month = $2
            ",
        )
        .bind(user_id)
        .bind(month.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read usage for {month}: {e}")))?;

        Ok(row.map_or_else(UsageRecord::default, |r| UsageRecord {
            recipe_queries: counter(r.get("recipe_queries")),
            recipes_generated: counter(r.get("recipes_generated")),
        }))
    }

    async fn increment(
        &self,
        user_id: &str,
        month: UsageMonth,
        field: UsageField,
    ) -> AppResult<()> {
        let (queries, generated) = match field {
            UsageField::RecipeQueries => (1_i64, 0_i64),
            UsageField::RecipesGenerated => (0, 1),
        };

        sqlx::query(
            r"
            INSERT INTO recipe_usage (user_id, month, recipe_queries, recipes_generated, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT(user_id, month) DO UPDATE SET
                recipe_queries = recipe_queries + excluded.recipe_queries,
                recipes_generated = recipes_generated + excluded.recipes_generated,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(month.to_string())
        .bind(queries)
        .bind(generated)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!(
                "Failed to increment {} for {month}: {e}",
                field.column()
            ))
        })?;

        Ok(())
    }
}
