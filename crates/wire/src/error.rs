// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error envelope (spec.md §6, §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oks_core::Error as DomainError;
use serde::Serialize;
use serde_json::{json, Value};

/// Wraps a domain [`DomainError`] with the HTTP status it maps to.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    details: Value,
}

impl ApiError {
    /// HTTP status per spec.md §7's mapping table.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::AccessDenied(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::InvalidState(_) => StatusCode::BAD_REQUEST,
            DomainError::NetworkFailure(_) | DomainError::ProviderFailure(_) => StatusCode::BAD_GATEWAY,
            DomainError::Timeout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::StorageFailure(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DomainError::SeparationError(_) | DomainError::DownloaderError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Cancelled(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.0.code(),
            details: json!({}),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
