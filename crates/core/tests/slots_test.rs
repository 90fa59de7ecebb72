use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use clinicbook_core::models::slot::{business_slot_times, HORIZON_DAYS, SLOT_MINUTES};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

#[test]
fn test_full_week_from_monday() {
    // Mon..Sun window: five weekdays, 16 half-hour slots each.
    let times = business_slot_times(monday(), HORIZON_DAYS);
    assert_eq!(times.len(), 5 * 16);

    let (first_start, first_end) = times[0];
    assert_eq!(first_start.to_rfc3339(), "2024-06-03T09:00:00+00:00");
    assert_eq!(first_end.to_rfc3339(), "2024-06-03T09:30:00+00:00");

    // Last slot is Friday 16:30-17:00.
    let (last_start, last_end) = times[times.len() - 1];
    assert_eq!(last_start.weekday(), Weekday::Fri);
    assert_eq!((last_start.hour(), last_start.minute()), (16, 30));
    assert_eq!(last_end.hour(), 17);
}

#[test]
fn test_weekends_excluded() {
    let times = business_slot_times(monday(), HORIZON_DAYS);
    assert!(times
        .iter()
        .all(|(start, _)| !matches!(start.weekday(), Weekday::Sat | Weekday::Sun)));
}

#[test]
fn test_every_slot_is_thirty_minutes_within_hours() {
    for (start, end) in business_slot_times(monday(), HORIZON_DAYS) {
        assert_eq!(end - start, Duration::minutes(SLOT_MINUTES));
        assert!(start.hour() >= 9 && start.hour() < 17);
    }
}

#[test]
fn test_ordered_ascending() {
    let times = business_slot_times(monday(), HORIZON_DAYS);
    assert!(times.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn test_deterministic() {
    assert_eq!(
        business_slot_times(monday(), HORIZON_DAYS),
        business_slot_times(monday(), HORIZON_DAYS)
    );
}

#[rstest]
// Saturday start: the weekend contributes nothing, five weekdays remain.
#[case(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 7, 5 * 16)]
// Saturday + Sunday only.
#[case(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 2, 0)]
// Single weekday.
#[case(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(), 1, 16)]
fn test_window_variations(#[case] from: NaiveDate, #[case] days: i64, #[case] expected: usize) {
    assert_eq!(business_slot_times(from, days).len(), expected);
}
