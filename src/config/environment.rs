// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses bind address, storage backend, LLM endpoint, and session limits from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use anyhow::{bail, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8081;
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/recipes.db";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 45;
const MIN_LLM_TIMEOUT_SECS: u64 = 5;
const MAX_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_LLM_TEMPERATURE: f32 = 0.7;
const DEFAULT_CONVERSATION_TTL_SECS: u64 = 86_400;
const DEFAULT_CONVERSATION_MAX_SESSIONS: usize = 10_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 90;

// ============================================================================
// Storage
// ============================================================================

/// Which implementation backs the usage ledger and conversation store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local maps, lost on restart
    #[default]
    Memory,
    /// `SQLite` database at `DATABASE_URL`
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("Invalid STORAGE_BACKEND '{other}': expected 'memory' or 'sqlite'"),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string, treating anything without a scheme as a file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(DEFAULT_DATABASE_URL)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

// ============================================================================
// Sections
// ============================================================================

/// OpenAI-compatible endpoint used by the AI gateway
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Bearer key, optional for local servers
    pub api_key: Option<String>,
    /// Caller-enforced timeout for a single AI call
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            model: DEFAULT_LLM_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

/// Session limits for the in-memory conversation store
#[derive(Debug, Clone, Copy)]
pub struct ConversationConfig {
    /// Idle lifetime of a conversation before it is treated as expired
    pub ttl: Duration,
    /// Maximum number of live conversations kept in memory
    pub max_sessions: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CONVERSATION_TTL_SECS),
            max_sessions: DEFAULT_CONVERSATION_MAX_SESSIONS,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub http_host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Storage backend for both stores
    pub storage_backend: StorageBackend,
    /// Database location, used when the backend is `sqlite`
    pub database_url: DatabaseUrl,
    /// LLM endpoint configuration
    pub llm: LlmConfig,
    /// Conversation session limits
    pub conversation: ConversationConfig,
    /// Whole-request timeout applied by the HTTP layer
    pub request_timeout: Duration,
    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_host: DEFAULT_HTTP_HOST.to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            storage_backend: StorageBackend::default(),
            database_url: DatabaseUrl::default(),
            llm: LlmConfig::default(),
            conversation: ConversationConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cors_origins: vec!["*".to_owned()],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Malformed numeric values fall back to their defaults with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORAGE_BACKEND` names an unknown backend
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let storage_backend = env_var_or("STORAGE_BACKEND", "memory").parse()?;

        let timeout_secs = parse_env_or("RECIPE_LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)
            .clamp(MIN_LLM_TIMEOUT_SECS, MAX_LLM_TIMEOUT_SECS);

        let config = Self {
            http_host: env_var_or("HTTP_HOST", DEFAULT_HTTP_HOST),
            http_port: parse_env_or("HTTP_PORT", DEFAULT_HTTP_PORT),
            storage_backend,
            database_url: DatabaseUrl::parse_url(&env_var_or(
                "DATABASE_URL",
                DEFAULT_DATABASE_URL,
            )),
            llm: LlmConfig {
                base_url: env_var_or("RECIPE_LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
                model: env_var_or("RECIPE_LLM_MODEL", DEFAULT_LLM_MODEL),
                api_key: env::var("RECIPE_LLM_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                timeout: Duration::from_secs(timeout_secs),
                temperature: parse_env_or("RECIPE_LLM_TEMPERATURE", DEFAULT_LLM_TEMPERATURE),
            },
            conversation: ConversationConfig {
                ttl: Duration::from_secs(parse_env_or(
                    "CONVERSATION_TTL_SECS",
                    DEFAULT_CONVERSATION_TTL_SECS,
                )),
                max_sessions: parse_env_or(
                    "CONVERSATION_MAX_SESSIONS",
                    DEFAULT_CONVERSATION_MAX_SESSIONS,
                )
                .max(1),
            },
            request_timeout: Duration::from_secs(parse_env_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
        };

        Ok(config)
    }

    /// Socket address string to bind the HTTP listener to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Recipe AI Server Configuration:\n\
             - Bind: {}\n\
             - Storage: {}\n\
             - Database: {}\n\
             - LLM endpoint: {}\n\
             - LLM model: {}\n\
             - LLM API key: {}\n\
             - LLM timeout: {}s\n\
             - Conversation TTL: {}s (max {} sessions)\n\
             - Request timeout: {}s",
            self.bind_address(),
            self.storage_backend,
            self.database_url,
            self.llm.base_url,
            self.llm.model,
            if self.llm.api_key.is_some() {
                "Configured"
            } else {
                "Not set"
            },
            self.llm.timeout.as_secs(),
            self.conversation.ttl.as_secs(),
            self.conversation.max_sessions,
            self.request_timeout.as_secs(),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, warning and falling back on malformed input
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {key} value '{raw}', using default {default}");
            default
        }),
        Err(_) => default,
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
