//! Error codes and the JSON error envelope returned by the HTTP API.
//!
//! DESIGN
//! ======
//! Service errors are `thiserror` enums that also implement [`ErrorCode`]:
//! a stable `E_*` string clients can branch on plus a retryable hint. Route
//! handlers convert them into [`ApiError`], which renders as
//! `{ "error": { "code", "message", "retryable" } }` with a matching status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Stable machine-readable classification of an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    error: &'a ErrorBody,
}

/// An error response: HTTP status plus the JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new<E: ErrorCode>(status: StatusCode, err: &E) -> Self {
        Self {
            status,
            body: ErrorBody { code: err.error_code(), message: err.to_string(), retryable: err.retryable() },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope { error: &self.body })).into_response()
    }
}
