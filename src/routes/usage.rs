// ABOUTME: Usage statistics route handler
// ABOUTME: Reports the caller's current month counters, tier limit, and reset instant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::authenticate;
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::UsageStats;

/// Usage routes handler
pub struct UsageRoutes;

impl UsageRoutes {
    /// Create all usage routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/usage/stats", get(Self::get_stats))
            .with_state(resources)
    }

    async fn get_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Json<UsageStats>, AppError> {
        let user = authenticate(&headers)?;
        let stats = resources
            .orchestrator
            .usage_stats(&user.user_id, user.tier)
            .await
            .map_err(|e| e.with_user_id(user.user_id.clone()))?;
        Ok(Json(stats))
    }
}
