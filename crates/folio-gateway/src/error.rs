// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`FolioError`] to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_core::FolioError;
use serde::Serialize;
use tracing::error;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Handler error wrapper.
#[derive(Debug)]
pub struct ApiError(pub FolioError);

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FolioError::IdentityUnavailable => StatusCode::UNAUTHORIZED,
            FolioError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            FolioError::NotFound { .. } => StatusCode::NOT_FOUND,
            FolioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FolioError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        // Backend internals stay out of 500 bodies.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
