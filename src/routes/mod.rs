// ABOUTME: Route module organization for the recipe assistant HTTP endpoints
// ABOUTME: Assembles domain routers and wraps them in the shared middleware stack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the recipe assistant
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the chat orchestrator.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{
    make_request_span, propagate_request_id_layer, set_request_id_layer, setup_cors,
};
use crate::resources::ServerResources;

/// Chat, recipe generation, and conversation routes
pub mod chat;
/// Health check routes
pub mod health;
/// Usage statistics routes
pub mod usage;

pub use chat::{ChatRoutes, PERSISTENCE_DEGRADED_HEADER};
pub use health::HealthRoutes;
pub use usage::UsageRoutes;

/// Largest accepted request body
pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// All routes without middleware
pub fn router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(UsageRoutes::routes(Arc::clone(resources)))
        .merge(HealthRoutes::routes())
}

/// All routes wrapped in request id, tracing, CORS, timeout, and body limit layers
pub fn app(resources: &Arc<ServerResources>) -> Router {
    let config = &resources.config;

    router(resources)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(propagate_request_id_layer())
                .layer(setup_cors(config))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout,
                )),
        )
}
