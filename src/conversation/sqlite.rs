// ABOUTME: SQLite-backed conversation store with ordered message rows per user session
// ABOUTME: Seeds the welcome message inside a transaction so it is written exactly once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};

use super::ConversationStore;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{ConversationMessage, ConversationState, MessageRole, Recipe};

/// Durable conversation store over `chat_sessions` and `chat_session_messages`
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    /// Create a store over an initialized database
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))
    }

    async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {e}")))
    }

    /// Create the session row if missing and seed the welcome message
    ///
    /// `ON CONFLICT DO NOTHING` reports zero affected rows for an existing
    /// session, so only the creating transaction writes the welcome message.
    async fn ensure_session(tx: &mut Transaction<'static, Sqlite>, user_id: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();

        let created = sqlx::query(
            r"
            INSERT INTO chat_sessions (user_id, suggestions, created_at, updated_at)
            VALUES ($1, '[]', $2, $2)
            ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(&now)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?
        .rows_affected()
            > 0;

        if created {
            debug!(user_id, "Seeding new conversation");
            Self::insert_message(tx, user_id, &ConversationMessage::welcome(), &now).await?;
        }

        Ok(())
    }

    async fn insert_message(
        tx: &mut Transaction<'static, Sqlite>,
        user_id: &str,
        message: &ConversationMessage,
        now: &str,
    ) -> AppResult<()> {
        let recipe_json = message
            .recipe
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO chat_session_messages (user_id, role, content, recipe, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(recipe_json)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to append message: {e}")))?;

        Ok(())
    }

    async fn touch(tx: &mut Transaction<'static, Sqlite>, user_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE chat_sessions SET updated_at = $1 WHERE user_id = $2")
            .bind(Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update conversation: {e}")))?;
        Ok(())
    }

    async fn load_state(&self, user_id: &str) -> AppResult<ConversationState> {
        let suggestions_json: String =
            sqlx::query("SELECT suggestions FROM chat_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to read conversation: {e}")))?
                .map_or_else(|| "[]".to_owned(), |row| row.get("suggestions"));

        let rows = sqlx::query(
            r"
            SELECT role, content, recipe
            FROM chat_session_messages
            WHERE user_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read messages: {e}")))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows {
            let role: String = row.get("role");
            let Some(role) = MessageRole::from_str_opt(&role) else {
                warn!(user_id, role = %role, "Skipping message with unknown role");
                continue;
            };
            let recipe: Option<String> = row.get("recipe");
            let recipe = recipe
                .as_deref()
                .map(serde_json::from_str::<Recipe>)
                .transpose()?;
            messages.push(ConversationMessage {
                role,
                content: row.get("content"),
                recipe,
            });
        }

        Ok(ConversationState {
            messages,
            suggestions: serde_json::from_str(&suggestions_json)?,
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get_conversation(&self, user_id: &str) -> AppResult<ConversationState> {
        let mut tx = self.begin().await?;
        Self::ensure_session(&mut tx, user_id).await?;
        Self::commit(tx).await?;

        self.load_state(user_id).await
    }

    async fn append_turn(&self, user_id: &str, messages: &[ConversationMessage]) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.begin().await?;
        Self::ensure_session(&mut tx, user_id).await?;
        for message in messages {
            Self::insert_message(&mut tx, user_id, message, &now).await?;
        }
        Self::touch(&mut tx, user_id).await?;
        Self::commit(tx).await
    }

    async fn set_suggestions(&self, user_id: &str, suggestions: &[String]) -> AppResult<()> {
        let suggestions_json = serde_json::to_string(suggestions)?;
        let mut tx = self.begin().await?;
        Self::ensure_session(&mut tx, user_id).await?;

        sqlx::query(
            r"
            UPDATE chat_sessions
            SET suggestions = $1, updated_at = $2
            WHERE user_id = $3
            ",
        )
        .bind(suggestions_json)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to store suggestions: {e}")))?;

        Self::commit(tx).await
    }

    async fn clear(&self, user_id: &str) -> AppResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.begin().await?;

        sqlx::query(
            r"
            INSERT INTO chat_sessions (user_id, suggestions, created_at, updated_at)
            VALUES ($1, '[]', $2, $2)
            ON CONFLICT(user_id) DO UPDATE SET suggestions = '[]', updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear conversation: {e}")))?;

        sqlx::query("DELETE FROM chat_session_messages WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear messages: {e}")))?;

        Self::commit(tx).await
    }
}
