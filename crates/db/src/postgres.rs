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
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::{
    DbBooking, DbBookingDetails, DbSession, DbSlot, DbSlotWithBooking, DbUser,
};
use crate::storage::Storage;

/// SQLSTATE codes raised by constraint violations (Postgres).
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct PgStorage {
    pool: Pool<Postgres>,
}

impl PgStorage {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn db_err(err: sqlx::Error) -> ClinicError {
    ClinicError::Database(eyre::Report::new(err))
}

/// Maps constraint violations on the bookings insert to typed failures:
/// the UNIQUE (slot_id) constraint is the double-booking arbiter, and the
/// slot foreign key catches inserts against unknown slots.
fn categorize_booking_error(err: sqlx::Error, slot_id: Uuid) -> ClinicError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return ClinicError::Conflict(format!("Slot {slot_id} is already booked"));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                let constraint = db.constraint().unwrap_or_default();
                if constraint.contains("user") {
                    return ClinicError::NotFound("Booking user not found".to_string());
                }
                return ClinicError::NotFound(format!("Slot with ID {slot_id} not found"));
            }
            _ => {}
        }
    }
    db_err(err)
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: Uuid) -> ClinicResult<Option<User>> {
        let user = sqlx::query_as::<_, DbUser>(
            r#"
            SELECT id, email, first_name, last_name, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(user.map(User::from))
    }

    async fn upsert_user(&self, user: NewUser) -> ClinicResult<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        tracing::debug!("Upserting user: email={}, role={}", user.email, user.role.as_str());

        let row = sqlx::query_as::<_, DbUser>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (email) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                role = EXCLUDED.role,
                updated_at = EXCLUDED.updated_at
            RETURNING id, email, first_name, last_name, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn create_slot(
        &self,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> ClinicResult<Slot> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let slot = sqlx::query_as::<_, DbSlot>(
            r#"
            INSERT INTO slots (id, start_at, end_at, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, start_at, end_at, created_at
            "#,
        )
        .bind(id)
        .bind(start_at)
        .bind(end_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(slot.into())
    }

    async fn get_slot(&self, id: Uuid) -> ClinicResult<Option<Slot>> {
        let slot = sqlx::query_as::<_, DbSlot>(
            r#"
            SELECT id, start_at, end_at, created_at
            FROM slots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(slot.map(Slot::from))
    }

    async fn get_slots_in_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ClinicResult<Vec<SlotWithBooking>> {
        tracing::debug!("Listing slots in window: from={}, to={}", from, to);

        let rows = sqlx::query_as::<_, DbSlotWithBooking>(
            r#"
            SELECT s.id, s.start_at, s.end_at, s.created_at,
                   b.id AS booking_id,
                   b.user_id AS booking_user_id,
                   b.created_at AS booking_created_at
            FROM slots s
            LEFT JOIN bookings b ON b.slot_id = s.id
            WHERE s.start_at >= $1 AND s.start_at <= $2
            ORDER BY s.start_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(SlotWithBooking::from).collect())
    }

    async fn create_booking(&self, user_id: Uuid, slot_id: Uuid) -> ClinicResult<Booking> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        tracing::debug!("Creating booking: user_id={}, slot_id={}", user_id, slot_id);

        // No read-then-write here: the insert either wins the slot or loses
        // to the UNIQUE (slot_id) constraint, even under concurrent callers.
        let booking = sqlx::query_as::<_, DbBooking>(
            r#"
            INSERT INTO bookings (id, user_id, slot_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, slot_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(slot_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| categorize_booking_error(e, slot_id))?;

        Ok(booking.into())
    }

    async fn get_booking_by_slot(&self, slot_id: Uuid) -> ClinicResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, DbBooking>(
            r#"
            SELECT id, user_id, slot_id, created_at
            FROM bookings
            WHERE slot_id = $1
            "#,
        )
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(booking.map(Booking::from))
    }

    async fn get_user_bookings(&self, user_id: Uuid) -> ClinicResult<Vec<BookingWithDetails>> {
        let rows = sqlx::query_as::<_, DbBookingDetails>(
            r#"
            SELECT b.id, b.user_id, b.slot_id, b.created_at,
                   u.email, u.first_name, u.last_name, u.role,
                   u.created_at AS user_created_at, u.updated_at AS user_updated_at,
                   s.start_at, s.end_at, s.created_at AS slot_created_at
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            JOIN slots s ON s.id = b.slot_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(BookingWithDetails::from).collect())
    }

    async fn get_all_bookings(&self) -> ClinicResult<Vec<BookingWithDetails>> {
        let rows = sqlx::query_as::<_, DbBookingDetails>(
            r#"
            SELECT b.id, b.user_id, b.slot_id, b.created_at,
                   u.email, u.first_name, u.last_name, u.role,
                   u.created_at AS user_created_at, u.updated_at AS user_updated_at,
                   s.start_at, s.end_at, s.created_at AS slot_created_at
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            JOIN slots s ON s.id = b.slot_id
            ORDER BY b.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(BookingWithDetails::from).collect())
    }

    async fn create_session(
        &self,
        sid: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ClinicResult<Session> {
        let session = sqlx::query_as::<_, DbSession>(
            r#"
            INSERT INTO sessions (sid, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING sid, user_id, expires_at
            "#,
        )
        .bind(sid)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(session.into())
    }

    async fn get_session(&self, sid: &str) -> ClinicResult<Option<Session>> {
        let session = sqlx::query_as::<_, DbSession>(
            r#"
            SELECT sid, user_id, expires_at
            FROM sessions
            WHERE sid = $1 AND expires_at > NOW()
            "#,
        )
        .bind(sid)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(session.map(Session::from))
    }

    async fn delete_session(&self, sid: &str) -> ClinicResult<()> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE sid = $1
            "#,
        )
        .bind(sid)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
