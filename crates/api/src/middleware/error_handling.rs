//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses so every
//! endpoint fails the same way: 404 for missing entities, 409 for booking
//! conflicts, 400 for malformed input, 401/403 for auth failures, and 500
//! for anything unexpected.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clinicbook_core::errors::ClinicError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps `ClinicError` and implements `IntoResponse`, which lets
/// handlers use `?` on any storage or validation result.
#[derive(Debug)]
pub struct AppError(pub ClinicError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::Conflict(_) => StatusCode::CONFLICT,
            ClinicError::Validation(_) => StatusCode::BAD_REQUEST,
            ClinicError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ClinicError::Authorization(_) => StatusCode::FORBIDDEN,
            ClinicError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClinicError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Unexpected failures are logged in full; the client gets a generic
        // message rather than driver internals.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ClinicError::Database(err))
    }
}
