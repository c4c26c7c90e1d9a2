use chrono::prelude::*;
use chrono::{Duration, LocalResult};
use chrono_tz::Tz;

/// The calendar date on which `instant` falls when viewed from `tz`.
pub fn day_in_zone(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn add_days(day: NaiveDate, days: i64) -> NaiveDate {
    day + Duration::days(days)
}

/// All calendar days from `start` to `end`, both included. Empty when
/// `end` is before `start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

/// The absolute instant at which the wall clock in `tz` reads
/// `day` `hour`:`minute`. Ambiguous local times (DST fall-back) resolve
/// to the earliest valid offset; nonexistent local times (spring-forward
/// gap) advance to the next hour that exists.
pub fn instant_in_zone(day: NaiveDate, hour: u32, minute: u32, tz: Tz) -> DateTime<Utc> {
    let mut naive = day
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN));
    for _ in 0..3 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => naive += Duration::hours(1),
        }
    }
    Utc.from_utc_datetime(&naive)
}

/// Hour and minute of `instant` on the wall clock in `tz`.
pub fn time_parts_in_zone(instant: DateTime<Utc>, tz: Tz) -> (u32, u32) {
    let local = instant.with_timezone(&tz);
    (local.hour(), local.minute())
}

/// The half-open UTC instant range covering the whole of `day` in UTC.
pub fn utc_day_range(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&add_days(day, 1).and_time(NaiveTime::MIN));
    (start, end)
}
