// ABOUTME: Centralized resource container shared by every HTTP handler
// ABOUTME: Wires the configured storage backend and LLM provider into the chat orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and shared behind an `Arc`.

use std::sync::Arc;

use tracing::info;

use crate::config::{ServerConfig, StorageBackend};
use crate::conversation::{ConversationStore, InMemoryConversationStore, SqliteConversationStore};
use crate::database::Database;
use crate::errors::AppResult;
use crate::gateway::AiGateway;
use crate::llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use crate::services::ChatOrchestrator;
use crate::usage::{InMemoryUsageLedger, SqliteUsageLedger, UsageLedger};

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Chat and generation entry points
    pub orchestrator: ChatOrchestrator,
    /// In-memory conversation store, kept for periodic expiry sweeps
    pub session_store: Option<InMemoryConversationStore>,
}

impl ServerResources {
    /// Assemble resources from already-built parts
    #[must_use]
    pub fn new(config: ServerConfig, orchestrator: ChatOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
            session_store: None,
        }
    }

    /// Attach the in-memory store so the binary can sweep expired sessions
    #[must_use]
    pub fn with_session_store(mut self, store: InMemoryConversationStore) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Build every collaborator from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the database
    /// cannot be opened and migrated
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::from_llm_config(&config.llm),
        )?);
        info!(
            provider = provider.name(),
            model = %config.llm.model,
            "LLM provider configured"
        );
        let gateway = AiGateway::from_config(provider, &config.llm);

        match config.storage_backend {
            StorageBackend::Memory => {
                let store = InMemoryConversationStore::new(config.conversation);
                let ledger: Arc<dyn UsageLedger> = Arc::new(InMemoryUsageLedger::new());
                let conversations: Arc<dyn ConversationStore> = Arc::new(store.clone());
                info!("Using in-memory storage");
                let orchestrator = ChatOrchestrator::new(gateway, ledger, conversations);
                Ok(Self::new(config, orchestrator).with_session_store(store))
            }
            StorageBackend::Sqlite => {
                let database = Database::connect(&config.database_url).await?;
                info!(database = %config.database_url, "Using SQLite storage");
                let ledger: Arc<dyn UsageLedger> = Arc::new(SqliteUsageLedger::new(&database));
                let conversations: Arc<dyn ConversationStore> =
                    Arc::new(SqliteConversationStore::new(&database));
                let orchestrator = ChatOrchestrator::new(gateway, ledger, conversations);
                Ok(Self::new(config, orchestrator))
            }
        }
    }
}
