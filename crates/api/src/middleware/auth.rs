//! # Session Authentication
//!
//! Session-cookie plumbing and the request extractors that gate protected
//! endpoints. A login mints an opaque session id, stores it server-side, and
//! hands it to the client as an HttpOnly cookie; `CurrentUser` resolves the
//! cookie back to a user on each request, and `AdminUser` additionally
//! requires the admin role. Authorization happens once here at the boundary,
//! not inside individual handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use clinicbook_core::{
    errors::ClinicError,
    models::user::{User, UserRole},
};
use rand::{distributions::Alphanumeric, Rng};

use crate::{middleware::error_handling::AppError, ApiState};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "clinicbook_session";

const SESSION_ID_LEN: usize = 32;

/// Mints an opaque session id from the OS-seeded RNG.
pub fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Pulls the session id out of the request's Cookie header, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(|value| value.to_string())
    })
}

/// Set-Cookie value establishing a session for `max_age_secs`.
pub fn session_cookie(sid: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Set-Cookie value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// The authenticated caller, resolved from the session cookie.
///
/// Rejects with 401 when the cookie is missing, the session is expired or
/// unknown, or the user no longer exists.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let sid = session_id_from_headers(&parts.headers).ok_or_else(|| {
            ClinicError::Authentication("Authentication required".to_string())
        })?;

        let session = state.storage.get_session(&sid).await?.ok_or_else(|| {
            ClinicError::Authentication("Session expired or invalid".to_string())
        })?;

        let user = state.storage.get_user(session.user_id).await?.ok_or_else(|| {
            ClinicError::Authentication("User not found".to_string())
        })?;

        Ok(CurrentUser(user))
    }
}

/// An authenticated caller holding the admin role.
///
/// Rejects with 401 when unauthenticated and 403 when the caller is not an
/// admin.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(AppError(ClinicError::Authorization(
                "Admin access required".to_string(),
            )));
        }

        Ok(AdminUser(user))
    }
}
