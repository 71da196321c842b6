// ABOUTME: HTTP middleware for request tracing, CORS, and request limits
// ABOUTME: Wraps the router with request ids, spans, timeouts, and body size limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS configuration
pub mod cors;
/// Request id propagation and HTTP spans
pub mod tracing;

pub use cors::setup_cors;
pub use self::tracing::{
    make_request_span, propagate_request_id_layer, set_request_id_layer, REQUEST_ID_HEADER,
};
