use chrono::{DateTime, Utc};
use clinicbook_core::models::{
    booking::{Booking, BookingWithDetails},
    session::Session,
    slot::{Slot, SlotWithBooking},
    user::{User, UserRole},
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: UserRole::parse(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<DbSlot> for Slot {
    fn from(row: DbSlot) -> Self {
        Slot {
            id: row.id,
            start_at: row.start_at,
            end_at: row.end_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<DbBooking> for Booking {
    fn from(row: DbBooking) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            slot_id: row.slot_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSession {
    pub sid: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<DbSession> for Session {
    fn from(row: DbSession) -> Self {
        Session {
            sid: row.sid,
            user_id: row.user_id,
            expires_at: row.expires_at,
        }
    }
}

/// Slot row left-joined against its booking. The booking columns are all
/// NULL when the slot is free.
#[derive(Debug, Clone, FromRow)]
pub struct DbSlotWithBooking {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub booking_id: Option<Uuid>,
    pub booking_user_id: Option<Uuid>,
    pub booking_created_at: Option<DateTime<Utc>>,
}

impl From<DbSlotWithBooking> for SlotWithBooking {
    fn from(row: DbSlotWithBooking) -> Self {
        let booking = match (row.booking_id, row.booking_user_id, row.booking_created_at) {
            (Some(id), Some(user_id), Some(created_at)) => Some(Booking {
                id,
                user_id,
                slot_id: row.id,
                created_at,
            }),
            _ => None,
        };

        SlotWithBooking {
            slot: Slot {
                id: row.id,
                start_at: row.start_at,
                end_at: row.end_at,
                created_at: row.created_at,
            },
            booking,
        }
    }
}

/// Booking row joined with its user and slot, flattened for `query_as`.
#[derive(Debug, Clone, FromRow)]
pub struct DbBookingDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slot_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub user_created_at: DateTime<Utc>,
    pub user_updated_at: DateTime<Utc>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub slot_created_at: DateTime<Utc>,
}

impl From<DbBookingDetails> for BookingWithDetails {
    fn from(row: DbBookingDetails) -> Self {
        BookingWithDetails {
            booking: Booking {
                id: row.id,
                user_id: row.user_id,
                slot_id: row.slot_id,
                created_at: row.created_at,
            },
            user: User {
                id: row.user_id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                role: UserRole::parse(&row.role),
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
            slot: Slot {
                id: row.slot_id,
                start_at: row.start_at,
                end_at: row.end_at,
                created_at: row.slot_created_at,
            },
        }
    }
}
