use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::booking::Booking;

/// Clinic hours: slots run from 09:00 (inclusive) to 17:00 (exclusive) UTC.
pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 17;
pub const SLOT_MINUTES: i64 = 30;
/// Rolling booking horizon in calendar days.
pub const HORIZON_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A slot paired with its booking, if any. Booked slots stay in the
/// availability view so clients can render them as taken rather than hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotWithBooking {
    #[serde(flatten)]
    pub slot: Slot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

/// Generates the `[start, end)` pairs for every bookable half-hour in the
/// `days`-day window starting at `from`. Weekends are skipped entirely.
/// Deterministic and ordered ascending by start time.
pub fn business_slot_times(from: NaiveDate, days: i64) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut times = Vec::new();

    for day in 0..days {
        let date = from + Duration::days(day);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        for hour in OPENING_HOUR..CLOSING_HOUR {
            for minute in [0, 30] {
                let start = date
                    .and_hms_opt(hour, minute, 0)
                    .expect("clinic hours are valid times of day")
                    .and_utc();
                times.push((start, start + Duration::minutes(SLOT_MINUTES)));
            }
        }
    }

    times
}
