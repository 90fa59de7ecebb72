use chrono::{DateTime, Duration, Utc};
use clinicbook_core::{
    errors::ClinicResult,
    models::{
        slot::{business_slot_times, HORIZON_DAYS},
        user::{NewUser, User, UserRole},
    },
};
use tracing::info;

use crate::storage::Storage;

pub const ADMIN_EMAIL: &str = "admin@clinic.com";

/// Ensures the built-in admin account exists.
pub async fn seed_admin_user(storage: &dyn Storage) -> ClinicResult<User> {
    storage
        .upsert_user(NewUser {
            email: ADMIN_EMAIL.to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            role: UserRole::Admin,
        })
        .await
}

/// Generates bookable slots for the rolling horizon starting at `now`.
/// Idempotent: if the window already holds any slots, nothing is created.
/// Returns the number of slots created.
pub async fn seed_slots(storage: &dyn Storage, now: DateTime<Utc>) -> ClinicResult<usize> {
    let horizon = now + Duration::days(HORIZON_DAYS);

    let existing = storage.get_slots_in_window(now, horizon).await?;
    if !existing.is_empty() {
        info!("Slots already seeded for the current window, skipping generation");
        return Ok(0);
    }

    info!("Generating appointment slots...");
    let times = business_slot_times(now.date_naive(), HORIZON_DAYS);
    for (start_at, end_at) in &times {
        storage.create_slot(*start_at, *end_at).await?;
    }

    info!("Generated {} appointment slots", times.len());
    Ok(times.len())
}
