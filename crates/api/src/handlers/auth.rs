use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::AppendHeaders,
    Json,
};
use chrono::{Duration, Utc};
use clinicbook_core::{
    errors::ClinicError,
    models::{
        session::SESSION_TTL_DAYS,
        user::{LoginRequest, NewUser, User},
    },
};
use serde_json::{json, Value};

use crate::{middleware::auth, middleware::error_handling::AppError, ApiState};

/// Mock login: upserts the user by email and establishes a session. Identity
/// issuance is not this service's job, so the payload names its own role.
#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<Value>,
) -> Result<(AppendHeaders<[(header::HeaderName, String); 1]>, Json<User>), AppError> {
    let payload: LoginRequest = serde_json::from_value(payload)
        .map_err(|e| ClinicError::Validation(format!("Invalid login payload: {e}")))?;

    if payload.email.trim().is_empty() {
        return Err(AppError(ClinicError::Validation(
            "Email is required".to_string(),
        )));
    }

    // Display name is derived from the email local part, as real names are
    // not part of the mocked identity.
    let first_name = payload
        .email
        .split('@')
        .next()
        .unwrap_or(&payload.email)
        .to_string();

    let user = state
        .storage
        .upsert_user(NewUser {
            email: payload.email.clone(),
            first_name,
            last_name: "User".to_string(),
            role: payload.role,
        })
        .await?;

    let sid = auth::generate_session_id();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state.storage.create_session(&sid, user.id, expires_at).await?;

    tracing::info!("User logged in: id={}, role={}", user.id, user.role.as_str());

    let cookie = auth::session_cookie(&sid, SESSION_TTL_DAYS * 24 * 60 * 60);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(user)))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<(AppendHeaders<[(header::HeaderName, String); 1]>, Json<Value>), AppError> {
    if let Some(sid) = auth::session_id_from_headers(&headers) {
        state.storage.delete_session(&sid).await?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn current_user(user: auth::CurrentUser) -> Json<User> {
    Json(user.0)
}
