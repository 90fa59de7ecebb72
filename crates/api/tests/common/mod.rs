use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use clinicbook_api::ApiState;
use clinicbook_core::models::{
    slot::Slot,
    user::{NewUser, User, UserRole},
};
use clinicbook_db::{MemStorage, Storage};

/// Fresh map-backed state plus a handle on the storage for direct seeding.
pub fn mem_state() -> (Arc<ApiState>, Arc<MemStorage>) {
    let storage = Arc::new(MemStorage::new());
    let state = Arc::new(ApiState {
        storage: storage.clone(),
    });
    (state, storage)
}

pub async fn create_user(storage: &MemStorage, email: &str, role: UserRole) -> User {
    storage
        .upsert_user(NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        })
        .await
        .expect("Failed to create user")
}

pub async fn create_slot(storage: &MemStorage, start_at: DateTime<Utc>) -> Slot {
    storage
        .create_slot(start_at, start_at + Duration::minutes(30))
        .await
        .expect("Failed to create slot")
}
