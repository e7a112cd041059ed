// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 ACS contributors

//! Maps [`acs_core::error::AcsError`] onto HTTP status codes and the
//! `{success, value?, error?}` response envelope.

use acs_core::error::{AcsError, ErrorKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Newtype so this crate can implement the foreign `IntoResponse` trait for
/// the foreign `AcsError` type.
pub struct ApiError(pub AcsError);

impl From<AcsError> for ApiError {
    fn from(error: AcsError) -> Self {
        Self(error)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict | ErrorKind::DependenciesExist => StatusCode::CONFLICT,
        ErrorKind::InvalidArgument | ErrorKind::CycleDetected => StatusCode::BAD_REQUEST,
        ErrorKind::Backpressure => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::IntegrityViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::PersistenceFailure | ErrorKind::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind);
        tracing::warn!(kind = %self.0.kind.as_str(), message = %self.0.message, "request failed");
        let body = Envelope {
            success: false,
            error: ErrorBody { kind: self.0.kind.as_str(), message: self.0.message, details: self.0.details },
        };
        (status, Json(body)).into_response()
    }
}
