// ABOUTME: Tests for environment-driven server configuration loading
// ABOUTME: Covers defaults, malformed values, timeout clamping, and backend selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::{env, path::PathBuf, time::Duration};

use recipe_ai_server::config::{DatabaseUrl, ServerConfig, StorageBackend};
use serial_test::serial;

const CONFIG_VARS: &[&str] = &[
    "HTTP_HOST",
    "HTTP_PORT",
    "STORAGE_BACKEND",
    "DATABASE_URL",
    "RECIPE_LLM_BASE_URL",
    "RECIPE_LLM_MODEL",
    "RECIPE_LLM_API_KEY",
    "RECIPE_LLM_TIMEOUT_SECS",
    "RECIPE_LLM_TEMPERATURE",
    "CONVERSATION_TTL_SECS",
    "CONVERSATION_MAX_SESSIONS",
    "REQUEST_TIMEOUT_SECS",
    "CORS_ORIGINS",
];

fn clear_env() {
    for var in CONFIG_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:8081");
    assert_eq!(config.storage_backend, StorageBackend::Memory);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.timeout, Duration::from_secs(45));
    assert_eq!(config.conversation.ttl, Duration::from_secs(86_400));
    assert_eq!(config.cors_origins, vec!["*"]);
    assert!(config.summary().contains("LLM API key: Not set"));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var("HTTP_PORT", "9100");
    env::set_var("STORAGE_BACKEND", "SQLite");
    env::set_var("DATABASE_URL", "sqlite:/tmp/recipes-test.db");
    env::set_var("RECIPE_LLM_BASE_URL", "http://localhost:11434/v1");
    env::set_var("RECIPE_LLM_MODEL", "llama3.1");
    env::set_var("RECIPE_LLM_API_KEY", "sk-test");
    env::set_var("CORS_ORIGINS", "http://app.test, http://admin.test");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 9100);
    assert_eq!(config.storage_backend, StorageBackend::Sqlite);
    assert_eq!(
        config.database_url,
        DatabaseUrl::SQLite {
            path: PathBuf::from("/tmp/recipes-test.db")
        }
    );
    assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
    assert_eq!(config.llm.model, "llama3.1");
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(
        config.cors_origins,
        vec!["http://app.test", "http://admin.test"]
    );

    let summary = config.summary();
    assert!(summary.contains("LLM API key: Configured"));
    assert!(!summary.contains("sk-test"));

    clear_env();
}

#[test]
#[serial]
fn test_malformed_numbers_fall_back_to_defaults() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    env::set_var("RECIPE_LLM_TEMPERATURE", "warm");
    env::set_var("CONVERSATION_MAX_SESSIONS", "0");
    env::set_var("RECIPE_LLM_API_KEY", "   ");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.conversation.max_sessions, 1);
    assert!(config.llm.api_key.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_llm_timeout_is_clamped() {
    clear_env();

    env::set_var("RECIPE_LLM_TIMEOUT_SECS", "1");
    assert_eq!(
        ServerConfig::from_env().unwrap().llm.timeout,
        Duration::from_secs(5)
    );

    env::set_var("RECIPE_LLM_TIMEOUT_SECS", "600");
    assert_eq!(
        ServerConfig::from_env().unwrap().llm.timeout,
        Duration::from_secs(120)
    );

    env::set_var("RECIPE_LLM_TIMEOUT_SECS", "30");
    assert_eq!(
        ServerConfig::from_env().unwrap().llm.timeout,
        Duration::from_secs(30)
    );

    clear_env();
}

#[test]
#[serial]
fn test_unknown_storage_backend_is_rejected() {
    clear_env();
    env::set_var("STORAGE_BACKEND", "postgres");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("postgres"));

    clear_env();
}

#[test]
fn test_database_url_parsing() {
    assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
    assert_eq!(DatabaseUrl::parse_url(":memory:"), DatabaseUrl::Memory);
    assert!(DatabaseUrl::Memory.is_memory());

    let file = DatabaseUrl::parse_url("./data/recipes.db");
    assert!(!file.is_memory());
    assert_eq!(file.to_connection_string(), "sqlite:./data/recipes.db");
    assert_eq!(
        DatabaseUrl::parse_url("sqlite:./data/recipes.db"),
        file
    );
}
