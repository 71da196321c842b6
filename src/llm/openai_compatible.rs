// ABOUTME: Generic OpenAI-compatible LLM provider for hosted and local endpoints
// ABOUTME: Speaks /chat/completions and maps HTTP failures onto provider error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Works with any endpoint implementing the `OpenAI` chat completions API:
//! `OpenAI` itself, Ollama, vLLM, `LocalAI`, and hosted gateways.
//!
//! ## Error mapping
//!
//! | Upstream | Error code |
//! |---|---|
//! | 401, 403 | `EXTERNAL_AUTH_FAILED` |
//! | 429 | `EXTERNAL_RATE_LIMITED` |
//! | 5xx, connection refused | `EXTERNAL_SERVICE_UNAVAILABLE` |
//! | client timeout | `EXTERNAL_TIMEOUT` |
//! | anything else | `EXTERNAL_SERVICE_ERROR` |

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::errors::{AppError, ErrorCode};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upper bound on a single HTTP exchange; the gateway applies the tighter
/// per-call timeout
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Service label used in error messages
const SERVICE_NAME: &str = "LLM provider";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// OpenAI-compatible API request structure
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Message structure for OpenAI-compatible API
#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

/// `response_format` request field
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// OpenAI-compatible API response structure
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

/// Usage statistics in response
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(rename = "prompt_tokens")]
    prompt: u32,
    #[serde(rename = "completion_tokens")]
    completion: u32,
    #[serde(rename = "total_tokens")]
    total: u32,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Well-known endpoint families, detected from the base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// api.openai.com
    OpenAi,
    /// Ollama's OpenAI-compatible API
    Ollama,
    /// vLLM server
    Vllm,
    /// `LocalAI` server
    LocalAi,
    /// Anything else speaking the same protocol
    Generic,
}

impl EndpointKind {
    /// Guess the endpoint family from its base URL
    #[must_use]
    pub fn detect(base_url: &str) -> Self {
        if base_url.contains("api.openai.com") {
            Self::OpenAi
        } else if base_url.contains(":11434") {
            Self::Ollama
        } else if base_url.contains(":8000") {
            Self::Vllm
        } else if base_url.contains(":8080") {
            Self::LocalAi
        } else {
            Self::Generic
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Vllm => "vllm",
            Self::LocalAi => "localai",
            Self::Generic => "openai-compatible",
        }
    }

    const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Ollama => "Ollama (Local)",
            Self::Vllm => "vLLM (Local)",
            Self::LocalAi => "LocalAI",
            Self::Generic => "OpenAI-compatible endpoint",
        }
    }

    /// Capabilities advertised by this endpoint family
    #[must_use]
    pub const fn capabilities(self) -> LlmCapabilities {
        match self {
            Self::OpenAi | Self::Ollama | Self::Vllm | Self::Generic => {
                LlmCapabilities::chat_completions()
            }
            Self::LocalAi => LlmCapabilities::text_only(),
        }
    }
}

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Endpoint family, drives naming and capabilities
    pub kind: EndpointKind,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Build provider configuration from the server's LLM settings
    #[must_use]
    pub fn from_llm_config(config: &LlmConfig) -> Self {
        let kind = EndpointKind::detect(&config.base_url);
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            kind,
            capabilities: kind.capabilities(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing {} provider: base_url={}, model={}",
            config.kind.display_name(),
            config.base_url,
            config.default_model
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Add authorization header if API key is configured
    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.bearer_auth(api_key)
        } else {
            request
        }
    }

    /// Map a transport failure onto a provider error
    fn transport_error(&self, e: &reqwest::Error) -> AppError {
        error!("Request to {} failed: {}", self.config.kind.name(), e);
        if e.is_timeout() {
            AppError::external_timeout(SERVICE_NAME, REQUEST_TIMEOUT_SECS)
        } else if e.is_connect() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot connect to {} at {}",
                    self.config.kind.display_name(),
                    self.config.base_url
                ),
            )
        } else {
            AppError::external_service(SERVICE_NAME, format!("Request failed: {e}"))
        }
    }

    /// Parse error response from API
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let (message, error_type) = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| (body.chars().take(200).collect::<String>(), None),
            |parsed| (parsed.error.message, parsed.error.error_type),
        );

        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE_NAME} rejected the API key: {message}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_rate_limit_message(&message),
            ),
            500..=599 => AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{SERVICE_NAME} unavailable ({status}): {message}"),
            ),
            _ => AppError::external_service(
                SERVICE_NAME,
                format!(
                    "{} ({status}): {message}",
                    error_type.as_deref().unwrap_or("api_error")
                ),
            ),
        }
    }

    /// Extract a user-friendly rate limit message
    ///
    /// `OpenAI`-style rate limit errors may include "try again in Xs".
    fn extract_rate_limit_message(message: &str) -> String {
        let lower = message.to_lowercase();
        if let Some(retry_pos) = lower.find("try again in ") {
            let after_prefix = &lower[retry_pos + "try again in ".len()..];
            let end_pos = after_prefix
                .find(|c: char| !c.is_ascii_digit() && c != '.')
                .unwrap_or(after_prefix.len());
            if let Ok(seconds) = after_prefix[..end_pos].parse::<f64>() {
                let seconds_int = seconds.ceil() as u64;
                return format!(
                    "AI rate limit reached. Please try again in {seconds_int} seconds."
                );
            }
        }
        "AI rate limit reached. Please wait a moment and try again.".to_owned()
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        self.config.kind.name()
    }

    fn display_name(&self) -> &'static str {
        self.config.kind.display_name()
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(provider = self.name(), json_mode = request.json_mode))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let json_mode = request.json_mode && self.config.capabilities.supports_json_mode();
        let openai_request = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            stream: false,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!(
            model,
            messages = openai_request.messages.len(),
            "Sending chat completion request"
        );
        let started = Instant::now();

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            warn!(status = %status, "Chat completion request rejected");
            return Err(Self::parse_error_response(status, &body));
        }

        let openai_response: OpenAiResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            AppError::external_service(SERVICE_NAME, format!("Malformed response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE_NAME, "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();

        debug!(
            model,
            latency_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: openai_response.model.unwrap_or_else(|| model.to_owned()),
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt,
                completion_tokens: u.completion,
                total_tokens: u.total,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        debug!(
            "Performing {} health check at {}",
            self.config.kind.name(),
            self.config.base_url
        );

        let response = self
            .add_auth_header(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let healthy = response.status().is_success();
        if !healthy {
            warn!(
                "{} health check failed with status: {}",
                self.config.kind.name(),
                response.status()
            );
        }

        Ok(healthy)
    }
}
