use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_TTL_DAYS: i64 = 7;

/// A server-side session: an opaque id handed to the client as a cookie,
/// resolved back to a user on each request. Expired sessions read as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub sid: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
