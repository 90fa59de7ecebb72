use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use clinicbook_core::models::slot::{SlotWithBooking, HORIZON_DAYS};

use crate::{middleware::error_handling::AppError, ApiState};

/// Availability for the rolling booking window, each slot paired with its
/// booking if taken. The read is not isolated from concurrent bookings; a
/// slot shown free here may already be gone by the time it is claimed.
#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<SlotWithBooking>>, AppError> {
    let now = Utc::now();
    let slots = state
        .storage
        .get_slots_in_window(now, now + Duration::days(HORIZON_DAYS))
        .await?;

    Ok(Json(slots))
}
