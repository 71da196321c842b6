// ABOUTME: AI gateway exposing chat completion and structured recipe generation
// ABOUTME: Applies the caller-side timeout, system instructions, and output post-processing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # AI Gateway
//!
//! The only component that talks to the LLM provider. Each operation makes
//! exactly one provider call bounded by a timeout and never retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::config::LlmConfig;
use crate::constants::conversation::RECIPE_CONTEXT_MESSAGES;
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::{build_generation_prompt, get_chat_system_prompt};
use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmProvider};
use crate::models::{ConversationMessage, Recipe};
use crate::recipes::parse_recipe_response;
use crate::suggestions::normalize_bullets;

/// Gateway over a single LLM provider
#[derive(Clone)]
pub struct AiGateway {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl AiGateway {
    /// Create a gateway with the given per-call timeout and provider defaults
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            model: None,
            temperature: None,
            timeout,
        }
    }

    /// Create a gateway from the server's LLM settings
    #[must_use]
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self::new(provider, config.timeout)
            .with_model(config.model.clone())
            .with_temperature(config.temperature)
    }

    /// Override the provider's default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Underlying provider, used for health reporting
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Free-form chat over the full conversation
    ///
    /// Bullet glyph list markers in the reply are rewritten as hyphens.
    ///
    /// # Errors
    ///
    /// Returns a provider error on transport failure or timeout, or if the
    /// provider returns an empty reply
    #[instrument(skip_all, fields(provider = self.provider.name(), messages = messages.len()))]
    pub async fn chat(&self, messages: &[ConversationMessage]) -> AppResult<String> {
        let mut chat_messages = Vec::with_capacity(messages.len() + 1);
        chat_messages.push(self.instruction(get_chat_system_prompt()));
        chat_messages.extend(messages.iter().map(ChatMessage::from));

        let response = self.call(ChatRequest::new(chat_messages)).await?;
        if response.content.trim().is_empty() {
            warn!("Provider returned an empty chat reply");
            return Err(AppError::external_service(
                self.provider.display_name(),
                "Empty response from AI",
            ));
        }

        Ok(normalize_bullets(&response.content))
    }

    /// Generate a structured recipe from a prompt and recent context
    ///
    /// Only the last four context messages are used, in their original order.
    ///
    /// # Errors
    ///
    /// Returns a provider error on transport failure or timeout, and
    /// `GENERATION_FAILED` if the reply is not a valid recipe
    #[instrument(skip_all, fields(provider = self.provider.name(), context = context.len()))]
    pub async fn generate_recipe(
        &self,
        prompt: &str,
        context: &[ConversationMessage],
    ) -> AppResult<Recipe> {
        let start = context.len().saturating_sub(RECIPE_CONTEXT_MESSAGES);
        let instruction = build_generation_prompt(prompt, &context[start..]);

        let mut request = ChatRequest::new(vec![ChatMessage::user(instruction)]);
        if self.provider.capabilities().supports_json_mode() {
            request = request.with_json_mode();
        }

        let response = self.call(request).await?;
        let recipe = parse_recipe_response(&response.content)?;

        debug!(title = %recipe.title, "Recipe generated");
        Ok(recipe)
    }

    /// System instruction, downgraded to a user message for providers
    /// without system-message support
    fn instruction(&self, text: &str) -> ChatMessage {
        if self.provider.capabilities().supports_system_messages() {
            ChatMessage::system(text)
        } else {
            ChatMessage::user(text)
        }
    }

    async fn call(&self, mut request: ChatRequest) -> AppResult<ChatResponse> {
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        match timeout(self.timeout, self.provider.complete(&request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "AI call exceeded timeout"
                );
                Err(AppError::external_timeout(
                    self.provider.display_name(),
                    self.timeout.as_secs(),
                ))
            }
        }
    }
}
