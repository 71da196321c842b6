// ABOUTME: Chat orchestration domain service coordinating the usage-metered AI pipeline
// ABOUTME: Sequences quota checks, AI calls, suggestion extraction, and store updates per turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat Orchestrator
//!
//! Two metered entry points, each a single request/response:
//!
//! - [`ChatOrchestrator::handle_chat`]: counted but never gated by quota.
//! - [`ChatOrchestrator::handle_generate_recipe`]: gated; the quota check
//!   completes before any AI call is made.
//!
//! The orchestrator holds no per-user state between calls. Persistence runs
//! after the AI call; if it fails the AI result is still returned, flagged
//! with `persisted: false`, and the failure is logged as a lost update.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::constants::conversation::{MAX_USER_MESSAGE_CHARS, RECIPE_CONTEXT_MESSAGES};
use crate::conversation::ConversationStore;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::gateway::AiGateway;
use crate::models::{
    ConversationMessage, ConversationState, MessageRole, QuotaCheck, Recipe, SubscriptionTier,
    UsageField,
};
use crate::suggestions;
use crate::usage::{UsageLedger, UsageMonth};

// ============================================================================
// Inputs and Outcomes
// ============================================================================

/// What the client sent for a chat turn
#[derive(Debug, Clone)]
pub enum ChatInput {
    /// Just the new user message; history comes from the conversation store
    Message(String),
    /// Full history resent by the client, ending with the new user message
    History(Vec<ConversationMessage>),
}

/// Result of a chat turn
#[derive(Debug, Clone)]
pub struct ChatTurnOutcome {
    /// Assistant reply, bullet glyphs normalized to hyphens
    pub response: String,
    /// Suggestions extracted from the reply
    pub suggestions: Vec<String>,
    /// False when the conversation or usage update failed after the AI call
    pub persisted: bool,
}

/// Result of a recipe generation turn
#[derive(Debug, Clone)]
pub struct RecipeOutcome {
    /// Generated recipe
    pub recipe: Recipe,
    /// False when the conversation or usage update failed after the AI call
    pub persisted: bool,
}

/// Current month usage as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    /// Month key, `YYYY-MM`
    pub current_month: String,
    /// Chat and generation turns this month
    pub recipe_queries: u32,
    /// Successful generations this month
    pub recipes_generated: u32,
    /// Caller's tier
    pub tier: SubscriptionTier,
    /// Generation limit, `-1` when unlimited
    pub limit: i64,
    /// Generations left this month, `-1` when unlimited
    pub remaining: i64,
    /// When the counters reset (RFC 3339)
    pub reset_at: String,
}

// ============================================================================
// Validation
// ============================================================================

/// Trim and bound a user-authored message
fn validate_user_content(content: &str, field: &str) -> AppResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    let length = trimmed.chars().count();
    if length > MAX_USER_MESSAGE_CHARS {
        return Err(AppError::invalid_input(format!(
            "'{field}' must be at most {MAX_USER_MESSAGE_CHARS} characters, got {length}"
        ))
        .with_details(serde_json::json!({
            "field": field,
            "maxLength": MAX_USER_MESSAGE_CHARS,
        })));
    }
    Ok(trimmed.to_owned())
}

/// Resolve a chat input into the new user message plus optional client history
fn validate_chat_input(
    input: ChatInput,
) -> AppResult<(ConversationMessage, Option<Vec<ConversationMessage>>)> {
    match input {
        ChatInput::Message(content) => {
            let content = validate_user_content(&content, "message")?;
            Ok((ConversationMessage::user(content), None))
        }
        ChatInput::History(mut messages) => {
            let Some(last) = messages.pop() else {
                return Err(AppError::missing_field("messages"));
            };
            if last.role != MessageRole::User {
                return Err(AppError::invalid_input(
                    "The last message in 'messages' must come from the user",
                ));
            }
            let content = validate_user_content(&last.content, "messages")?;
            Ok((ConversationMessage::user(content), Some(messages)))
        }
    }
}

fn confirmation_message(title: &str) -> String {
    format!("I've created a recipe for \"{title}\". You'll find the ingredients and steps below.")
}

/// Persistence failure after the AI call already succeeded
fn log_lost_update(user_id: &str, operation: &'static str, error: &AppError) {
    error!(
        user_id,
        operation,
        error_kind = ErrorKind::Store.as_str(),
        code = ?error.code,
        lost_update = true,
        "Persistence failed after successful AI call: {}",
        error
    );
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Coordinates the usage ledger, conversation store, and AI gateway
#[derive(Clone)]
pub struct ChatOrchestrator {
    gateway: AiGateway,
    usage: Arc<dyn UsageLedger>,
    conversations: Arc<dyn ConversationStore>,
}

impl ChatOrchestrator {
    /// Create an orchestrator over the given collaborators
    #[must_use]
    pub fn new(
        gateway: AiGateway,
        usage: Arc<dyn UsageLedger>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            gateway,
            usage,
            conversations,
        }
    }

    /// AI gateway, for health reporting
    #[must_use]
    pub const fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    /// Run one chat turn
    ///
    /// Chat is counted against `recipeQueries` but never rejected for quota.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, a store error if the
    /// conversation cannot be loaded, or a provider error from the AI call
    #[instrument(skip(self, input), fields(user_id = %user_id, tier = %tier))]
    pub async fn handle_chat(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
        input: ChatInput,
    ) -> AppResult<ChatTurnOutcome> {
        let (user_message, client_history) = validate_chat_input(input)?;
        let month = UsageMonth::current();

        let state = self.conversations.get_conversation(user_id).await?;
        let mut working = client_history.unwrap_or(state.messages);
        working.push(user_message.clone());

        let response = self.gateway.chat(&working).await?;
        let suggestions = suggestions::extract(&response);

        let mut persisted = true;
        let turn = [user_message, ConversationMessage::assistant(response.clone())];
        if let Err(e) = self.conversations.append_turn(user_id, &turn).await {
            log_lost_update(user_id, "append_turn", &e);
            persisted = false;
        }
        if let Err(e) = self
            .conversations
            .set_suggestions(user_id, &suggestions)
            .await
        {
            log_lost_update(user_id, "set_suggestions", &e);
            persisted = false;
        }
        if let Err(e) = self
            .usage
            .increment(user_id, month, UsageField::RecipeQueries)
            .await
        {
            log_lost_update(user_id, "increment_recipe_queries", &e);
            persisted = false;
        }

        info!(
            suggestions = suggestions.len(),
            persisted, "Chat turn completed"
        );
        Ok(ChatTurnOutcome {
            response,
            suggestions,
            persisted,
        })
    }

    /// Generate a recipe, gated by the tier's monthly quota
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or oversized prompt,
    /// `QUOTA_EXCEEDED` when the month's quota is used up (no AI call is made),
    /// a store error if the ledger or conversation cannot be read, a provider
    /// error from the AI call, or `GENERATION_FAILED` for unusable output
    #[instrument(skip(self, prompt), fields(user_id = %user_id, tier = %tier))]
    pub async fn handle_generate_recipe(
        &self,
        user_id: &str,
        tier: SubscriptionTier,
        prompt: &str,
    ) -> AppResult<RecipeOutcome> {
        let prompt = validate_user_content(prompt, "prompt")?;
        let month = UsageMonth::current();

        let quota = self.usage.check_quota(user_id, tier, month).await?;
        if !quota.allowed {
            return Err(Self::quota_error(tier, quota, month).with_user_id(user_id));
        }

        let state = self.conversations.get_conversation(user_id).await?;
        let context = state.recent_messages(RECIPE_CONTEXT_MESSAGES);

        let recipe = self.gateway.generate_recipe(&prompt, context).await?;

        let mut persisted = true;
        for field in [UsageField::RecipeQueries, UsageField::RecipesGenerated] {
            if let Err(e) = self.usage.increment(user_id, month, field).await {
                log_lost_update(user_id, field.column(), &e);
                persisted = false;
            }
        }

        let turn = [
            ConversationMessage::user(prompt),
            ConversationMessage::assistant_with_recipe(
                confirmation_message(&recipe.title),
                recipe.clone(),
            ),
        ];
        if let Err(e) = self.conversations.append_turn(user_id, &turn).await {
            log_lost_update(user_id, "append_turn", &e);
            persisted = false;
        }

        info!(title = %recipe.title, persisted, "Recipe generation completed");
        Ok(RecipeOutcome { recipe, persisted })
    }

    /// Current conversation, seeded on first access
    ///
    /// # Errors
    ///
    /// Returns a store error if the conversation cannot be read
    pub async fn get_conversation(&self, user_id: &str) -> AppResult<ConversationState> {
        self.conversations.get_conversation(user_id).await
    }

    /// Clear the conversation
    ///
    /// # Errors
    ///
    /// Returns a store error if the conversation cannot be written
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_conversation(&self, user_id: &str) -> AppResult<()> {
        self.conversations.clear(user_id).await?;
        info!("Conversation cleared");
        Ok(())
    }

    /// Usage figures for the current month
    ///
    /// # Errors
    ///
    /// Returns a store error if the ledger cannot be read
    pub async fn usage_stats(&self, user_id: &str, tier: SubscriptionTier) -> AppResult<UsageStats> {
        let month = UsageMonth::current();
        let usage = self.usage.get_usage(user_id, month).await?;
        let quota = QuotaCheck::evaluate(tier, usage.recipe_queries);

        Ok(UsageStats {
            current_month: month.to_string(),
            recipe_queries: usage.recipe_queries,
            recipes_generated: usage.recipes_generated,
            tier,
            limit: quota.limit_value(),
            remaining: quota.remaining().map_or(-1, i64::from),
            reset_at: month.reset_at_rfc3339(),
        })
    }

    fn quota_error(tier: SubscriptionTier, quota: QuotaCheck, month: UsageMonth) -> AppError {
        let limit = quota.limit.unwrap_or(quota.current);
        AppError::quota_exceeded(
            tier.as_str(),
            quota.current,
            limit,
            &month.reset_at_rfc3339(),
        )
    }
}
