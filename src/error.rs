// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API errors and their JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A blocking collaborator (preserve list, taxonomy) is loading or failed.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Detail used while a blocking fetch is still pending.
    pub const LOADING: &'static str = "loading";

    pub fn is_loading(&self) -> bool {
        matches!(self, AppError::Unavailable(msg) if msg == Self::LOADING)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable code for the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unavailable(_) => "unavailable",
        }
    }

    fn details(&self) -> &str {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Unavailable(msg) => msg,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    details: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unavailable(msg) => tracing::debug!(detail = %msg, "Catalog unavailable"),
            AppError::NotFound(msg) => tracing::debug!(detail = %msg, "Not found"),
            AppError::BadRequest(_) => {}
        }

        let body = ErrorBody {
            error: self.code(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
