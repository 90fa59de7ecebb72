use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinicbook_core::{
    errors::ClinicResult,
    models::{
        booking::{Booking, BookingWithDetails},
        session::Session,
        slot::{Slot, SlotWithBooking},
        user::{NewUser, User},
    },
};
use uuid::Uuid;

/// The entity store contract. Two implementations satisfy it: `PgStorage`
/// for production and `MemStorage` for tests; both uphold the same
/// at-most-one-booking-per-slot guarantee inside `create_booking`.
#[async_trait]
pub trait Storage: Send + Sync {
    // User operations
    async fn get_user(&self, id: Uuid) -> ClinicResult<Option<User>>;
    async fn upsert_user(&self, user: NewUser) -> ClinicResult<User>;

    // Slot operations
    async fn create_slot(
        &self,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> ClinicResult<Slot>;
    async fn get_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>>;
    /// Every slot with `start_at` in `[from, to]`, each paired with its
    /// booking if one exists, ordered ascending by start time. Booked slots
    /// are included, never filtered out.
    async fn get_slots_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ClinicResult<Vec<SlotWithBooking>>;

    // Booking operations
    /// Atomic check-and-insert. Fails with `ClinicError::Conflict` if the
    /// slot already has a booking and `ClinicError::NotFound` if the slot
    /// does not exist. Must stay race-safe under concurrent callers, so
    /// implementations may not use an unguarded read-then-write.
    async fn create_booking(&self, user_id: Uuid, slot_id: Uuid) -> ClinicResult<Booking>;
    async fn get_booking_by_slot(&self, slot_id: Uuid) -> ClinicResult<Option<Booking>>;
    /// A user's bookings with user and slot details, newest first.
    async fn get_user_bookings(&self, user_id: Uuid) -> ClinicResult<Vec<BookingWithDetails>>;
    /// All bookings with details, newest first. Authorization is the
    /// caller's concern; the store serves any pre-authorized call.
    async fn get_all_bookings(&self) -> ClinicResult<Vec<BookingWithDetails>>;

    // Session operations
    async fn create_session(
        &self,
        sid: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ClinicResult<Session>;
    /// Expired sessions are reported as absent.
    async fn get_session(&self, sid: &str) -> ClinicResult<Option<Session>>;
    async fn delete_session(&self, sid: &str) -> ClinicResult<()>;
}
