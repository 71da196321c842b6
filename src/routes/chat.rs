// ABOUTME: Chat route handlers for the recipe assistant conversation
// ABOUTME: Provides REST endpoints for chatting, generating recipes, and managing history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Chat routes for the recipe assistant
//!
//! Handlers resolve the caller from trusted headers, validate the body shape,
//! and delegate to the chat orchestrator.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::authenticate,
    errors::AppError,
    models::ConversationMessage,
    resources::ServerResources,
    routes::MAX_REQUEST_BODY_BYTES,
    services::ChatInput,
};

/// Set to `true` when the AI result was returned but could not be persisted
pub const PERSISTENCE_DEGRADED_HEADER: &str = "x-persistence-degraded";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to send a chat turn
///
/// Either the full history ending with the new user message, or just the
/// new message.
#[derive(Debug, Default, Deserialize)]
pub struct ChatTurnRequest {
    /// Full history resent by the client
    #[serde(default)]
    pub messages: Option<Vec<ConversationMessage>>,
    /// Just the new user message
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatTurnRequest {
    fn into_input(self) -> Result<ChatInput, AppError> {
        match (self.messages, self.message) {
            (Some(messages), _) => Ok(ChatInput::History(messages)),
            (None, Some(message)) => Ok(ChatInput::Message(message)),
            (None, None) => Err(AppError::missing_field("messages")),
        }
    }
}

/// Reply to a chat turn
#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    /// Assistant reply
    pub response: String,
    /// Suggestions extracted from the reply
    pub suggestions: Vec<String>,
}

/// Request to generate a recipe
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRecipeRequest {
    /// What the user wants to cook
    #[serde(default)]
    pub prompt: String,
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::send_message))
            .route("/api/chat/generate-recipe", post(Self::generate_recipe))
            .route(
                "/api/chat/conversation",
                get(Self::get_conversation).delete(Self::clear_conversation),
            )
            .with_state(resources)
    }

    /// Unwrap a JSON body, reporting shape and size errors in the standard error format
    fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
        body.map(|Json(value)| value).map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::payload_too_large(MAX_REQUEST_BODY_BYTES)
            } else {
                AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text()))
            }
        })
    }

    /// JSON response, flagged when persistence failed after the AI call
    fn respond<T: Serialize>(body: &T, persisted: bool) -> Response {
        let mut response = (StatusCode::OK, Json(body)).into_response();
        if !persisted {
            response.headers_mut().insert(
                HeaderName::from_static(PERSISTENCE_DEGRADED_HEADER),
                HeaderValue::from_static("true"),
            );
        }
        response
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Send a chat turn
    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<ChatTurnRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers)?;
        let input = Self::json_body(body)
            .and_then(ChatTurnRequest::into_input)
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;

        let outcome = resources
            .orchestrator
            .handle_chat(&user.user_id, user.tier, input)
            .await
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;

        let body = ChatTurnResponse {
            response: outcome.response,
            suggestions: outcome.suggestions,
        };
        Ok(Self::respond(&body, outcome.persisted))
    }

    /// Generate a structured recipe
    async fn generate_recipe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<GenerateRecipeRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers)?;
        let request = Self::json_body(body).map_err(|e| e.with_user_id(user.user_id.clone()))?;

        let outcome = resources
            .orchestrator
            .handle_generate_recipe(&user.user_id, user.tier, &request.prompt)
            .await
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;

        Ok(Self::respond(&outcome.recipe, outcome.persisted))
    }

    /// Get the conversation, seeding the welcome message on first access
    async fn get_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = authenticate(&headers)?;
        let state = resources
            .orchestrator
            .get_conversation(&user.user_id)
            .await
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;

        Ok((StatusCode::OK, Json(state)).into_response())
    }

    /// Clear the conversation
    async fn clear_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<StatusCode, AppError> {
        let user = authenticate(&headers)?;
        resources
            .orchestrator
            .clear_conversation(&user.user_id)
            .await
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;

        Ok(StatusCode::NO_CONTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_takes_precedence_over_message() {
        let request = ChatTurnRequest {
            messages: Some(vec![ConversationMessage::user("hi")]),
            message: Some("ignored".to_owned()),
        };
        assert!(matches!(request.into_input(), Ok(ChatInput::History(_))));
    }

    #[test]
    fn test_empty_body_is_missing_field() {
        assert!(ChatTurnRequest::default().into_input().is_err());
    }
}
