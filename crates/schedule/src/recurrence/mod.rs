//! Recurrence model and evaluator.
//!
//! One descriptor type covers both call sites: tasks use the date-only rules,
//! notifications add a time of day, an end date and per-day dedup through
//! `last_fired_at`. Fields a call site does not use are simply left unset.

mod descriptor;
mod error;
mod evaluator;
mod record;

#[cfg(test)]
mod tests;

pub use self::descriptor::{
    weekday_from_sunday0, OneShot, Recurrence, RecurrenceDescriptor, RecurrenceKind, TimeOfDay,
    WeekParity,
};
pub use self::error::InvalidDescriptor;
pub use self::evaluator::{
    due_dates_between, evaluate_record, is_due, matches_date, week_index, week_parity,
    PARITY_EPOCH_DAYS_FROM_CE, TIME_TOLERANCE_MINUTES,
};
pub use self::record::RecurrenceRecord;
