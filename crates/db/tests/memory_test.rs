use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clinicbook_core::{
    errors::ClinicError,
    models::{
        slot::HORIZON_DAYS,
        user::{NewUser, User, UserRole},
    },
};
use clinicbook_db::{seed, MemStorage, Storage};
use fake::{faker::internet::en::SafeEmail, Fake};
use pretty_assertions::assert_eq;
use uuid::Uuid;

async fn create_patient(storage: &MemStorage) -> User {
    storage
        .upsert_user(NewUser {
            email: SafeEmail().fake(),
            first_name: "Test".to_string(),
            last_name: "Patient".to_string(),
            role: UserRole::Patient,
        })
        .await
        .expect("Failed to create user")
}

#[tokio::test]
async fn test_booking_then_conflict() {
    let storage = MemStorage::new();
    let user1 = create_patient(&storage).await;
    let user2 = create_patient(&storage).await;

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
    let slot = storage
        .create_slot(start, start + Duration::minutes(30))
        .await
        .expect("Failed to create slot");

    let booking = storage
        .create_booking(user1.id, slot.id)
        .await
        .expect("First booking should win the slot");
    assert_eq!(booking.user_id, user1.id);
    assert_eq!(booking.slot_id, slot.id);

    let err = storage
        .create_booking(user2.id, slot.id)
        .await
        .expect_err("Second booking must be rejected");
    assert!(matches!(err, ClinicError::Conflict(_)));

    // The winner's booking is untouched by the losing attempt.
    let kept = storage
        .get_booking_by_slot(slot.id)
        .await
        .expect("Failed to read booking")
        .expect("Booking should exist");
    assert_eq!(kept.user_id, user1.id);
}

#[tokio::test]
async fn test_booking_unknown_slot_is_not_found() {
    let storage = MemStorage::new();
    let user = create_patient(&storage).await;

    let err = storage
        .create_booking(user.id, Uuid::new_v4())
        .await
        .expect_err("Unknown slot must be rejected");
    assert!(matches!(err, ClinicError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_bookings_exactly_one_wins() {
    let storage = Arc::new(MemStorage::new());

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
    let slot = storage
        .create_slot(start, start + Duration::minutes(30))
        .await
        .expect("Failed to create slot");

    let mut users = Vec::new();
    for _ in 0..25 {
        users.push(create_patient(&storage).await);
    }

    let slot_id = slot.id;
    let mut handles = Vec::new();
    for user in users {
        let storage = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage.create_booking(user.id, slot_id).await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("Task panicked") {
            Ok(_) => wins += 1,
            Err(ClinicError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("Unexpected error: {e:?}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 24);
}

#[tokio::test]
async fn test_availability_window_and_ordering() {
    let storage = MemStorage::new();
    let base = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

    // Insert out of order; one slot falls outside the window.
    let late = storage
        .create_slot(base + Duration::hours(2), base + Duration::hours(2) + Duration::minutes(30))
        .await
        .unwrap();
    let early = storage
        .create_slot(base, base + Duration::minutes(30))
        .await
        .unwrap();
    storage
        .create_slot(base + Duration::days(10), base + Duration::days(10) + Duration::minutes(30))
        .await
        .unwrap();

    let slots = storage
        .get_slots_in_window(base, base + Duration::days(HORIZON_DAYS))
        .await
        .expect("Failed to list slots");

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].slot.id, early.id);
    assert_eq!(slots[1].slot.id, late.id);
    assert!(slots.iter().all(|s| s.booking.is_none()));
}

#[tokio::test]
async fn test_booked_slot_stays_visible_with_its_booking() {
    let storage = MemStorage::new();
    let user = create_patient(&storage).await;
    let base = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

    let slot = storage
        .create_slot(base, base + Duration::minutes(30))
        .await
        .unwrap();
    storage.create_booking(user.id, slot.id).await.unwrap();

    let slots = storage
        .get_slots_in_window(base, base + Duration::days(HORIZON_DAYS))
        .await
        .expect("Failed to list slots");

    // Booked slots are not removed from the view, only paired with a booking.
    assert_eq!(slots.len(), 1);
    let booking = slots[0].booking.as_ref().expect("Booking should be joined");
    assert_eq!(booking.user_id, user.id);
}

#[tokio::test]
async fn test_booking_lists_newest_first() {
    let storage = MemStorage::new();
    let alice = create_patient(&storage).await;
    let bob = create_patient(&storage).await;
    let base = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();

    let mut slot_ids = Vec::new();
    for i in 0..3 {
        let start = base + Duration::minutes(30 * i);
        let slot = storage
            .create_slot(start, start + Duration::minutes(30))
            .await
            .unwrap();
        slot_ids.push(slot.id);
    }

    storage.create_booking(alice.id, slot_ids[0]).await.unwrap();
    storage.create_booking(bob.id, slot_ids[1]).await.unwrap();
    storage.create_booking(alice.id, slot_ids[2]).await.unwrap();

    let alices = storage.get_user_bookings(alice.id).await.unwrap();
    assert_eq!(alices.len(), 2);
    assert_eq!(alices[0].booking.slot_id, slot_ids[2]);
    assert_eq!(alices[1].booking.slot_id, slot_ids[0]);
    assert!(alices.iter().all(|b| b.user.id == alice.id));

    let all = storage.get_all_bookings().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].booking.slot_id, slot_ids[2]);
    assert_eq!(all[2].booking.slot_id, slot_ids[0]);
    assert!(all
        .windows(2)
        .all(|w| w[0].booking.created_at >= w[1].booking.created_at));
}

#[tokio::test]
async fn test_upsert_user_keeps_identity() {
    let storage = MemStorage::new();
    let email: String = SafeEmail().fake();

    let created = storage
        .upsert_user(NewUser {
            email: email.clone(),
            first_name: "First".to_string(),
            last_name: "User".to_string(),
            role: UserRole::Patient,
        })
        .await
        .unwrap();

    let updated = storage
        .upsert_user(NewUser {
            email: email.clone(),
            first_name: "Second".to_string(),
            last_name: "User".to_string(),
            role: UserRole::Admin,
        })
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.first_name, "Second");
    assert_eq!(updated.role, UserRole::Admin);
}

#[tokio::test]
async fn test_seed_slots_is_idempotent() {
    let storage = MemStorage::new();
    let now = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();

    let created = seed::seed_slots(&storage, now).await.unwrap();
    // Monday start: five weekdays of sixteen half-hour slots.
    assert_eq!(created, 5 * 16);

    let again = seed::seed_slots(&storage, now).await.unwrap();
    assert_eq!(again, 0);

    let slots = storage
        .get_slots_in_window(now, now + Duration::days(HORIZON_DAYS))
        .await
        .unwrap();
    assert_eq!(slots.len(), 5 * 16);
}

#[tokio::test]
async fn test_seed_admin_user() {
    let storage = MemStorage::new();

    let admin = seed::seed_admin_user(&storage).await.unwrap();
    assert_eq!(admin.email, seed::ADMIN_EMAIL);
    assert_eq!(admin.role, UserRole::Admin);

    // Re-seeding does not mint a second account.
    let again = seed::seed_admin_user(&storage).await.unwrap();
    assert_eq!(again.id, admin.id);
}

#[tokio::test]
async fn test_sessions_expire() {
    let storage = MemStorage::new();
    let user = create_patient(&storage).await;

    storage
        .create_session("live-session", user.id, Utc::now() + Duration::days(7))
        .await
        .unwrap();
    storage
        .create_session("dead-session", user.id, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let live = storage.get_session("live-session").await.unwrap();
    assert_eq!(live.expect("Session should be live").user_id, user.id);

    // Expired sessions read as absent.
    assert!(storage.get_session("dead-session").await.unwrap().is_none());

    storage.delete_session("live-session").await.unwrap();
    assert!(storage.get_session("live-session").await.unwrap().is_none());
}
