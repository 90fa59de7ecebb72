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
use mockall::mock;
use uuid::Uuid;

use crate::storage::Storage;

// Mock storage for expectation-style handler tests
mock! {
    pub Storage {}

    #[async_trait]
    impl Storage for Storage {
        async fn get_user(&self, id: Uuid) -> ClinicResult<Option<User>>;
        async fn upsert_user(&self, user: NewUser) -> ClinicResult<User>;

        async fn create_slot(
            &self,
            start_at: DateTime<Utc>,
            end_at: DateTime<Utc>,
        ) -> ClinicResult<Slot>;
        async fn get_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>>;
        async fn get_slots_in_window(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> ClinicResult<Vec<SlotWithBooking>>;

        async fn create_booking(&self, user_id: Uuid, slot_id: Uuid) -> ClinicResult<Booking>;
        async fn get_booking_by_slot(&self, slot_id: Uuid) -> ClinicResult<Option<Booking>>;
        async fn get_user_bookings(&self, user_id: Uuid) -> ClinicResult<Vec<BookingWithDetails>>;
        async fn get_all_bookings(&self) -> ClinicResult<Vec<BookingWithDetails>>;

        async fn create_session(
            &self,
            sid: &str,
            user_id: Uuid,
            expires_at: DateTime<Utc>,
        ) -> ClinicResult<Session>;
        async fn get_session(&self, sid: &str) -> ClinicResult<Option<Session>>;
        async fn delete_session(&self, sid: &str) -> ClinicResult<()>;
    }
}
