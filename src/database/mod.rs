// ABOUTME: SQLite connection pool and idempotent schema for usage and conversation tables
// ABOUTME: Shared by the SQLite usage ledger and SQLite conversation store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Owns the `SQLite` pool used by the durable store backends. The schema is
//! created on connect and every statement is idempotent, so connecting to an
//! existing database is safe.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Pool size for file-backed databases
const MAX_CONNECTIONS: u32 = 8;

/// Database handle for the durable store backends
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and apply the schema
    ///
    /// In-memory databases use a single long-lived connection so every query
    /// sees the same data.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database cannot be opened,
    /// or schema creation fails
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        let connection_string = url.to_connection_string();
        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL '{url}': {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let options = if url.is_memory() {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database {url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        info!("Database ready at {url}");
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_usage().await?;
        self.migrate_conversations().await
    }

    async fn migrate_usage(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS recipe_usage (
                user_id TEXT NOT NULL,
                month TEXT NOT NULL,
                recipe_queries INTEGER NOT NULL DEFAULT 0 CHECK (recipe_queries >= 0),
                recipes_generated INTEGER NOT NULL DEFAULT 0 CHECK (recipes_generated >= 0),
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, month)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe_usage table: {e}")))?;

        Ok(())
    }

    async fn migrate_conversations(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_sessions (
                user_id TEXT PRIMARY KEY,
                suggestions TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create chat_sessions table: {e}")))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_session_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES chat_sessions(user_id) ON DELETE CASCADE,
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
                content TEXT NOT NULL,
                recipe TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::database(format!("Failed to create chat_session_messages table: {e}"))
        })?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_chat_session_messages_user
            ON chat_session_messages(user_id, id)
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create message index: {e}")))?;

        Ok(())
    }
}
