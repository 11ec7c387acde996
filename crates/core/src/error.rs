// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain error kinds shared by every crate in the workspace.
//!
//! Each variant maps to exactly one HTTP status in `oks-wire`'s
//! `ApiError::into_response`. Adapter crates wrap their own lower-level
//! errors (`sqlx::Error`, `std::io::Error`, ...) into these variants at the
//! boundary rather than leaking them upward.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider failure: {0}")]
    ProviderFailure(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("separation error: {0}")]
    SeparationError(String),

    #[error("downloader error: {0}")]
    DownloaderError(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// `UPPER_SNAKE` machine-readable code, as required by spec.md §6's
    /// error response shape.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::InvalidState(_) => "INVALID_STATE",
            Error::AccessDenied(_) => "ACCESS_DENIED",
            Error::NetworkFailure(_) => "NETWORK_FAILURE",
            Error::Timeout(_) => "TIMEOUT",
            Error::ProviderFailure(_) => "PROVIDER_FAILURE",
            Error::StorageFailure(_) => "STORAGE_FAILURE",
            Error::SeparationError(_) => "SEPARATION_ERROR",
            Error::DownloaderError(_) => "DOWNLOADER_ERROR",
            Error::Cancelled(_) => "CANCELLED",
            Error::Internal(_) => "INTERNAL",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
