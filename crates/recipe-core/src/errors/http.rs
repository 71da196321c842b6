// ABOUTME: Axum response integration for AppError
// ABOUTME: Renders errors as JSON bodies with the status code mapped from ErrorCode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use super::{AppError, ErrorKind, ErrorResponse};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.kind() {
            ErrorKind::Store | ErrorKind::Internal | ErrorKind::Config => {
                tracing::error!(
                    error_kind = %self.kind(),
                    code = ?self.code,
                    user_id = self.context.user_id.as_deref().unwrap_or("-"),
                    "Request failed: {}",
                    self.message
                );
            }
            kind => {
                tracing::warn!(
                    error_kind = %kind,
                    code = ?self.code,
                    user_id = self.context.user_id.as_deref().unwrap_or("-"),
                    "Request rejected: {}",
                    self.message
                );
            }
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
