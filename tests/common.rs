// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, a scripted LLM provider, and store and orchestrator builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `recipe_ai_server`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use recipe_ai_server::{
    config::{ConversationConfig, DatabaseUrl, ServerConfig},
    conversation::{ConversationStore, InMemoryConversationStore},
    database::Database,
    errors::{AppError, AppResult, ErrorCode},
    gateway::AiGateway,
    llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider},
    models::{ConversationMessage, ConversationState},
    resources::ServerResources,
    services::ChatOrchestrator,
    usage::{InMemoryUsageLedger, UsageLedger},
};
use tempfile::TempDir;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Scripted LLM Provider
// ============================================================================

/// A valid recipe reply as a model would send it in JSON mode
pub const PASTA_RECIPE_JSON: &str = r#"{
    "title": "Quick Garlic Pasta",
    "description": "Weeknight spaghetti with garlic and olive oil",
    "ingredients": ["200g spaghetti", "3 cloves garlic", "3 tbsp olive oil"],
    "instructions": ["Boil the pasta", "Fry the garlic in oil", "Toss together"],
    "cookTime": 15,
    "servings": 2,
    "category": "dinner"
}"#;

/// LLM provider that answers from a queue of scripted replies
pub struct MockLlmProvider {
    replies: Mutex<VecDeque<Result<String, ErrorCode>>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
    delay: Option<Duration>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::chat_completions(),
            delay: None,
        }
    }

    /// Provider with system messages but no JSON mode
    pub fn text_only() -> Self {
        Self::new().with_capabilities(LlmCapabilities::text_only())
    }

    pub fn with_capabilities(mut self, capabilities: LlmCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_owned()));
    }

    pub fn push_error(&self, code: ErrorCode) {
        self.replies.lock().unwrap().push_back(Err(code));
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock LLM"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(ChatResponse {
                content,
                model: "mock-model".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Some(Err(code)) => Err(AppError::new(code, "Scripted provider failure")),
            None => Err(AppError::external_service("Mock LLM", "No scripted reply left")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

// ============================================================================
// Failing Conversation Store
// ============================================================================

/// Conversation store whose writes always fail
pub struct FailingWriteConversationStore;

#[async_trait]
impl ConversationStore for FailingWriteConversationStore {
    async fn get_conversation(&self, _user_id: &str) -> AppResult<ConversationState> {
        Ok(ConversationState::seeded())
    }

    async fn append_turn(&self, _user_id: &str, _messages: &[ConversationMessage]) -> AppResult<()> {
        Err(AppError::storage("disk full"))
    }

    async fn set_suggestions(&self, _user_id: &str, _suggestions: &[String]) -> AppResult<()> {
        Err(AppError::storage("disk full"))
    }

    async fn clear(&self, _user_id: &str) -> AppResult<()> {
        Err(AppError::storage("disk full"))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Orchestrator over in-memory stores, with handles to inspect them
pub struct TestHarness {
    pub provider: Arc<MockLlmProvider>,
    pub ledger: InMemoryUsageLedger,
    pub conversations: InMemoryConversationStore,
    pub orchestrator: ChatOrchestrator,
}

impl TestHarness {
    pub fn new(provider: MockLlmProvider) -> Self {
        init_test_logging();
        let provider = Arc::new(provider);
        let ledger = InMemoryUsageLedger::new();
        let conversations = InMemoryConversationStore::new(ConversationConfig::default());
        let orchestrator = ChatOrchestrator::new(
            test_gateway(Arc::clone(&provider)),
            Arc::new(ledger.clone()),
            Arc::new(conversations.clone()),
        );
        Self {
            provider,
            ledger,
            conversations,
            orchestrator,
        }
    }

    /// Server resources around this harness's orchestrator
    pub fn resources(&self) -> Arc<ServerResources> {
        Arc::new(ServerResources::new(
            ServerConfig::default(),
            self.orchestrator.clone(),
        ))
    }
}

pub fn test_gateway(provider: Arc<MockLlmProvider>) -> AiGateway {
    AiGateway::new(provider, Duration::from_secs(5))
}

/// Orchestrator with explicit collaborators
pub fn orchestrator_with(
    provider: Arc<MockLlmProvider>,
    ledger: Arc<dyn UsageLedger>,
    conversations: Arc<dyn ConversationStore>,
) -> ChatOrchestrator {
    init_test_logging();
    ChatOrchestrator::new(test_gateway(provider), ledger, conversations)
}

/// File-backed `SQLite` database in a fresh temporary directory
pub async fn create_test_database() -> (TempDir, Database) {
    init_test_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = DatabaseUrl::parse_url(&format!(
        "sqlite:{}",
        dir.path().join("recipes.db").display()
    ));
    let database = Database::connect(&url)
        .await
        .expect("Failed to open test database");
    (dir, database)
}

/// In-memory `SQLite` database
pub async fn create_memory_database() -> Database {
    init_test_logging();
    Database::connect(&DatabaseUrl::Memory)
        .await
        .expect("Failed to open in-memory database")
}
