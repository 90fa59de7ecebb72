use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use clinicbook_core::{
    errors::ClinicError,
    models::booking::{BookSlotRequest, Booking, BookingWithDetails},
};
use serde_json::Value;

use crate::{
    middleware::auth::{AdminUser, CurrentUser},
    middleware::error_handling::AppError,
    ApiState,
};

/// Claims a slot for the caller. The slot lookup gives unknown ids a clean
/// 404; the storage layer's atomic check-and-insert arbitrates races, so a
/// lost race surfaces as 409 no matter how close the contenders were.
#[axum::debug_handler]
pub async fn book_slot(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let payload: BookSlotRequest = serde_json::from_value(payload)
        .map_err(|e| ClinicError::Validation(format!("Invalid booking payload: {e}")))?;

    let slot = state
        .storage
        .get_slot(payload.slot_id)
        .await?
        .ok_or_else(|| {
            ClinicError::NotFound(format!("Slot with ID {} not found", payload.slot_id))
        })?;

    let booking = state.storage.create_booking(user.0.id, slot.id).await?;

    tracing::info!(
        "Booking created: id={}, user_id={}, slot_id={}",
        booking.id,
        booking.user_id,
        booking.slot_id
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

#[axum::debug_handler]
pub async fn my_bookings(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    let bookings = state.storage.get_user_bookings(user.0.id).await?;
    Ok(Json(bookings))
}

/// Privileged listing of every booking. The admin check already happened in
/// the `AdminUser` extractor; the handler does not re-derive it.
#[axum::debug_handler]
pub async fn all_bookings(
    State(state): State<Arc<ApiState>>,
    _admin: AdminUser,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    let bookings = state.storage.get_all_bookings().await?;
    Ok(Json(bookings))
}
