// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports liveness with the service name and version
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check route for load balancers and monitoring

use crate::constants::service_names;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes() -> axum::Router {
        use axum::{routing::get, Json, Router};

        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "ok",
                "service": service_names::RECIPE_AI_SERVER,
                "version": env!("CARGO_PKG_VERSION"),
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
