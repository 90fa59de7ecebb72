use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinicbook_core::{
    errors::{ClinicError, ClinicResult},
    models::{
        booking::{Booking, BookingWithDetails},
        session::Session,
        slot::{Slot, SlotWithBooking},
        user::{NewUser, User},
    },
};
use uuid::Uuid;

use crate::storage::Storage;

#[derive(Default)]
struct MemInner {
    users: HashMap<Uuid, User>,
    slots: HashMap<Uuid, Slot>,
    bookings: HashMap<Uuid, Booking>,
    sessions: HashMap<String, Session>,
}

/// Map-backed store for tests. The booking check-and-insert runs under a
/// single lock acquisition, which gives it the same atomicity contract as
/// the database's uniqueness constraint.
#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<MemInner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClinicResult<MutexGuard<'_, MemInner>> {
        self.inner
            .lock()
            .map_err(|_| ClinicError::Internal("storage mutex poisoned".into()))
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: Uuid) -> ClinicResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: NewUser) -> ClinicResult<User> {
        let mut inner = self.lock()?;
        let now = Utc::now();

        let existing = inner
            .users
            .values()
            .find(|u| u.email == user.email)
            .map(|u| (u.id, u.created_at));

        let user = match existing {
            Some((id, created_at)) => User {
                id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                created_at,
                updated_at: now,
            },
            None => User {
                id: Uuid::new_v4(),
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                created_at: now,
                updated_at: now,
            },
        };

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn create_slot(
        &self,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> ClinicResult<Slot> {
        let mut inner = self.lock()?;
        let slot = Slot {
            id: Uuid::new_v4(),
            start_at,
            end_at,
            created_at: Utc::now(),
        };
        inner.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn get_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>> {
        Ok(self.lock()?.slots.get(&id).cloned())
    }

    async fn get_slots_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ClinicResult<Vec<SlotWithBooking>> {
        let inner = self.lock()?;

        let mut slots: Vec<SlotWithBooking> = inner
            .slots
            .values()
            .filter(|slot| slot.start_at >= from && slot.start_at <= to)
            .map(|slot| SlotWithBooking {
                slot: slot.clone(),
                booking: inner
                    .bookings
                    .values()
                    .find(|b| b.slot_id == slot.id)
                    .cloned(),
            })
            .collect();

        slots.sort_by_key(|s| s.slot.start_at);
        Ok(slots)
    }

    async fn create_booking(&self, user_id: Uuid, slot_id: Uuid) -> ClinicResult<Booking> {
        // One lock section covers the whole check-and-insert.
        let mut inner = self.lock()?;

        if !inner.slots.contains_key(&slot_id) {
            return Err(ClinicError::NotFound(format!(
                "Slot with ID {slot_id} not found"
            )));
        }
        if inner.bookings.values().any(|b| b.slot_id == slot_id) {
            return Err(ClinicError::Conflict(format!(
                "Slot {slot_id} is already booked"
            )));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            slot_id,
            created_at: Utc::now(),
        };
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking_by_slot(&self, slot_id: Uuid) -> ClinicResult<Option<Booking>> {
        Ok(self
            .lock()?
            .bookings
            .values()
            .find(|b| b.slot_id == slot_id)
            .cloned())
    }

    async fn get_user_bookings(&self, user_id: Uuid) -> ClinicResult<Vec<BookingWithDetails>> {
        let inner = self.lock()?;

        let mut bookings: Vec<BookingWithDetails> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .filter_map(|b| join_details(&inner, b))
            .collect();

        bookings.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(bookings)
    }

    async fn get_all_bookings(&self) -> ClinicResult<Vec<BookingWithDetails>> {
        let inner = self.lock()?;

        let mut bookings: Vec<BookingWithDetails> = inner
            .bookings
            .values()
            .filter_map(|b| join_details(&inner, b))
            .collect();

        bookings.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
        Ok(bookings)
    }

    async fn create_session(
        &self,
        sid: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ClinicResult<Session> {
        let mut inner = self.lock()?;
        let session = Session {
            sid: sid.to_string(),
            user_id,
            expires_at,
        };
        inner.sessions.insert(session.sid.clone(), session.clone());
        Ok(session)
    }

    async fn get_session(&self, sid: &str) -> ClinicResult<Option<Session>> {
        Ok(self
            .lock()?
            .sessions
            .get(sid)
            .filter(|s| s.expires_at > Utc::now())
            .cloned())
    }

    async fn delete_session(&self, sid: &str) -> ClinicResult<()> {
        self.lock()?.sessions.remove(sid);
        Ok(())
    }
}

fn join_details(inner: &MemInner, booking: &Booking) -> Option<BookingWithDetails> {
    let user = inner.users.get(&booking.user_id)?;
    let slot = inner.slots.get(&booking.slot_id)?;

    Some(BookingWithDetails {
        booking: booking.clone(),
        user: user.clone(),
        slot: slot.clone(),
    })
}
