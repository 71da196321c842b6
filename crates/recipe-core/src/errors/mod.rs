// ABOUTME: Unified error handling with standard error codes and HTTP status mapping
// ABOUTME: Defines AppError, ErrorCode, ErrorKind, and the JSON error response body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the service returns [`AppResult`]. Each
//! [`ErrorCode`] belongs to exactly one [`ErrorKind`], which is what callers
//! match on to decide recovery: validation and quota errors are final,
//! provider errors are transient, generation errors mean the model answered
//! but the answer was unusable, and store errors mean persistence failed.

#[cfg(feature = "http-response")]
mod http;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication (1000-1999)
    /// No caller identity was supplied
    AuthRequired = 1000,
    /// Caller identity was supplied but is unusable
    AuthInvalid = 1001,

    // Quota (2000-2999)
    /// Monthly recipe generation quota reached
    QuotaExceeded = 2001,

    // Validation (3000-3999)
    /// Malformed request input
    InvalidInput = 3000,
    /// Required request field missing
    MissingRequiredField = 3001,
    /// Request body exceeds the accepted size
    PayloadTooLarge = 3002,

    // External services (5000-5999)
    /// LLM provider returned an error
    ExternalServiceError = 5000,
    /// LLM provider is unreachable or overloaded
    ExternalServiceUnavailable = 5001,
    /// LLM provider rejected our credentials
    ExternalAuthFailed = 5002,
    /// LLM provider rate limited the request
    ExternalRateLimited = 5003,
    /// LLM provider did not answer in time
    ExternalTimeout = 5004,
    /// LLM answered but the output violates the recipe contract
    GenerationFailed = 5005,

    // Configuration (6000-6999)
    /// Generic configuration error
    ConfigError = 6000,

    // Internal (9000-9999)
    /// Unexpected internal failure
    InternalError = 9000,
    /// Database operation failed
    DatabaseError = 9001,
    /// Storage operation failed
    StorageError = 9002,
    /// Serialization or deserialization failed
    SerializationError = 9003,
}

/// Coarse error classification used for recovery decisions and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, rejected before any AI or store call
    Validation,
    /// Caller identity missing or invalid
    Auth,
    /// Generation quota reached for the tier and month
    QuotaExceeded,
    /// Model output could not be turned into a recipe
    Generation,
    /// Transport-level failure talking to the LLM provider
    Provider,
    /// Usage ledger or conversation store failure
    Store,
    /// Misconfiguration
    Config,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Stable label used as a structured log field
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Generation => "generation",
            Self::Provider => "provider",
            Self::Store => "store",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidInput | Self::MissingRequiredField => 400,

            // 401 Unauthorized
            Self::AuthRequired | Self::AuthInvalid => 401,

            // 413 Payload Too Large
            Self::PayloadTooLarge => 413,

            // 429 Too Many Requests
            Self::QuotaExceeded => 429,

            // 502 Bad Gateway
            Self::ExternalServiceError | Self::GenerationFailed => 502,

            // 503 Service Unavailable
            Self::ExternalServiceUnavailable
            | Self::ExternalAuthFailed
            | Self::ExternalRateLimited => 503,

            // 504 Gateway Timeout
            Self::ExternalTimeout => 504,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::StorageError
            | Self::SerializationError
            | Self::ConfigError => 500,
        }
    }

    /// Classify this code into its recovery kind
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput | Self::MissingRequiredField | Self::PayloadTooLarge => {
                ErrorKind::Validation
            }
            Self::AuthRequired | Self::AuthInvalid => ErrorKind::Auth,
            Self::QuotaExceeded => ErrorKind::QuotaExceeded,
            Self::GenerationFailed => ErrorKind::Generation,
            Self::ExternalServiceError
            | Self::ExternalServiceUnavailable
            | Self::ExternalAuthFailed
            | Self::ExternalRateLimited
            | Self::ExternalTimeout => ErrorKind::Provider,
            Self::DatabaseError | Self::StorageError => ErrorKind::Store,
            Self::ConfigError => ErrorKind::Config,
            Self::InternalError | Self::SerializationError => ErrorKind::Internal,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication context is invalid",
            Self::QuotaExceeded => "Recipe generation quota exceeded for your current plan",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::PayloadTooLarge => "The request body is too large",
            Self::ExternalServiceError => "The AI service encountered an error",
            Self::ExternalServiceUnavailable => "The AI service is currently unavailable",
            Self::ExternalAuthFailed => "Authentication with the AI service failed",
            Self::ExternalRateLimited => "The AI service rate limit was exceeded",
            Self::ExternalTimeout => "The AI service did not respond in time",
            Self::GenerationFailed => "The AI response could not be turned into a recipe",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// User the failing request was made for
    pub user_id: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            user_id: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a user ID to the error context
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.context.user_id = Some(user_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Get the recovery kind for this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Error payload inside [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Structured details (quota figures, offending field, ...)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                details: error.context.details,
            },
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication context
    #[must_use]
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Missing required field
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field '{field}'"),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    /// Request body over the size limit
    #[must_use]
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!("Request body exceeds {limit_bytes} bytes"),
        )
        .with_details(serde_json::json!({ "limitBytes": limit_bytes }))
    }

    /// Quota exceeded for the given tier
    #[must_use]
    pub fn quota_exceeded(tier: &str, current: u32, limit: u32, reset_at: &str) -> Self {
        Self::new(
            ErrorCode::QuotaExceeded,
            format!("Monthly limit of {limit} recipe queries reached for the {tier} plan"),
        )
        .with_details(serde_json::json!({
            "tier": tier,
            "current": current,
            "limit": limit,
            "resetAt": reset_at,
        }))
    }

    /// Model output could not be turned into a recipe
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GenerationFailed, message)
    }

    /// External service error
    #[must_use]
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// External service did not answer in time
    #[must_use]
    pub fn external_timeout(service: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new(
            ErrorCode::ExternalTimeout,
            format!("{} did not respond within {timeout_secs}s", service.into()),
        )
    }

    /// Storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::QuotaExceeded.http_status(), 429);
        assert_eq!(ErrorCode::InvalidInput.http_status(), 400);
        assert_eq!(ErrorCode::PayloadTooLarge.http_status(), 413);
        assert_eq!(ErrorCode::GenerationFailed.http_status(), 502);
        assert_eq!(ErrorCode::ExternalTimeout.http_status(), 504);
        assert_eq!(ErrorCode::StorageError.http_status(), 500);
    }

    #[test]
    fn test_error_kinds_are_distinct_for_pipeline_failures() {
        assert_eq!(ErrorCode::InvalidInput.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::QuotaExceeded.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(ErrorCode::GenerationFailed.kind(), ErrorKind::Generation);
        assert_eq!(ErrorCode::ExternalRateLimited.kind(), ErrorKind::Provider);
        assert_eq!(ErrorCode::ExternalTimeout.kind(), ErrorKind::Provider);
        assert_eq!(ErrorCode::DatabaseError.kind(), ErrorKind::Store);
    }

    #[test]
    fn test_quota_exceeded_details() {
        let error = AppError::quota_exceeded("free", 5, 5, "2025-07-01T00:00:00+00:00");
        assert_eq!(error.code, ErrorCode::QuotaExceeded);
        assert_eq!(error.context.details["limit"], 5);
        assert_eq!(error.context.details["tier"], "free");
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::missing_field("prompt").with_user_id("user-1");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("MISSING_REQUIRED_FIELD"));
        assert!(json.contains("prompt"));
        assert!(!json.contains("user-1"));
    }

    #[test]
    fn test_null_details_are_omitted() {
        let response = ErrorResponse::from(AppError::generation("not json"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["code"], "GENERATION_FAILED");
        assert!(json["error"].get("details").is_none());
    }
}
