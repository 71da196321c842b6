// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Allows browser clients to send identity headers from configured origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::{SUBSCRIPTION_TIER_HEADER, USER_ID_HEADER};
use crate::config::ServerConfig;

use super::tracing::REQUEST_ID_HEADER;

/// Configure CORS from `CORS_ORIGINS`
///
/// `*` or an empty list allows any origin. Otherwise only the listed origins
/// are allowed; entries that are not valid header values are skipped.
#[must_use]
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let wildcard = config.cors_origins.is_empty() || config.cors_origins.iter().any(|o| o == "*");

    let allow_origin = if wildcard {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(SUBSCRIPTION_TIER_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
}
