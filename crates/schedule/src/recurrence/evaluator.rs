//! Due-check for recurring tasks and notifications.
//!
//! Everything here is a pure function of the descriptor and a UTC instant
//! supplied by the caller. Nothing reads the clock and nothing mutates the
//! descriptor; recording `last_fired_at` is the caller's job.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use tracing::warn;

use super::descriptor::{OneShot, Recurrence, RecurrenceDescriptor, TimeOfDay, WeekParity};
use super::record::RecurrenceRecord;

/// Days from CE of Monday 1969-12-29, the first day of week index 0.
///
/// Week indices count Monday-to-Sunday weeks from the week containing the
/// Unix epoch, which fixes biweekly parity independently of any calendar
/// library's week numbering.
pub const PARITY_EPOCH_DAYS_FROM_CE: i32 = 719_160;

/// Minutes of slack either side of `time_of_day`, since callers poll on a
/// coarse interval rather than at the exact minute.
pub const TIME_TOLERANCE_MINUTES: i32 = 1;

/// Monday-based week index relative to the parity epoch.
pub fn week_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - PARITY_EPOCH_DAYS_FROM_CE).div_euclid(7)
}

pub fn week_parity(date: NaiveDate) -> WeekParity {
    WeekParity::of_week_index(week_index(date))
}

fn rule_matches(rule: &Recurrence, date: NaiveDate) -> bool {
    match *rule {
        Recurrence::Once(OneShot::Date(due)) => date == due,
        Recurrence::Once(OneShot::At(at)) => date == at.date_naive(),
        Recurrence::Daily => true,
        Recurrence::Weekly { day } => date.weekday() == day,
        Recurrence::Biweekly { day, parity } => {
            date.weekday() == day && week_parity(date) == parity
        }
        // No clamping: a month without this day never matches.
        Recurrence::MonthlyByDate { day } => date.day() == u32::from(day),
    }
}

fn past_end(descriptor: &RecurrenceDescriptor, date: NaiveDate) -> bool {
    descriptor.end_date.is_some_and(|end| date > end)
}

fn time_matches(time: Option<TimeOfDay>, instant: DateTime<Utc>) -> bool {
    let Some(time) = time else {
        return true;
    };
    if instant.hour() != u32::from(time.hour()) {
        return false;
    }
    let delta = instant.minute() as i32 - i32::from(time.minute());
    delta.abs() <= TIME_TOLERANCE_MINUTES
}

/// Whether the item described by `descriptor` fires at `instant`.
///
/// Gates, in order: the end date, the already-fired check (once ever for
/// one-shot items, once per calendar day for recurring ones), the rule's
/// date match, then the time-of-day window.
pub fn is_due(descriptor: &RecurrenceDescriptor, instant: DateTime<Utc>) -> bool {
    let date = instant.date_naive();

    if past_end(descriptor, date) {
        return false;
    }

    match descriptor.rule {
        Recurrence::Once(shot) => {
            if descriptor.last_fired_at.is_some() {
                return false;
            }
            match shot {
                OneShot::Date(due) => date == due && time_matches(descriptor.time_of_day, instant),
                OneShot::At(at) => at <= instant,
            }
        }
        ref rule => {
            if descriptor
                .last_fired_at
                .is_some_and(|last| last.date_naive() == date)
            {
                return false;
            }
            rule_matches(rule, date) && time_matches(descriptor.time_of_day, instant)
        }
    }
}

/// Date-only part of the rule, for calendar display.
///
/// Ignores time of day and fire history; honours the end date.
pub fn matches_date(descriptor: &RecurrenceDescriptor, date: NaiveDate) -> bool {
    !past_end(descriptor, date) && rule_matches(&descriptor.rule, date)
}

/// Every date in `from..=to` on which the rule matches.
pub fn due_dates_between(
    descriptor: &RecurrenceDescriptor,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| matches_date(descriptor, *d))
        .collect()
}

/// Evaluate a raw persisted record, failing closed.
///
/// A record that does not form a valid descriptor is logged and reported as
/// not due, so a bad row can never cause a spurious fire.
pub fn evaluate_record(item_id: &str, record: &RecurrenceRecord, instant: DateTime<Utc>) -> bool {
    match RecurrenceDescriptor::try_from(record.clone()) {
        Ok(descriptor) => is_due(&descriptor, instant),
        Err(e) => {
            warn!(item_id = %item_id, error = %e, "invalid recurrence descriptor, treating as not due");
            false
        }
    }
}
