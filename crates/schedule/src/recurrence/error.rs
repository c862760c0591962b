//! The single error kind of the recurrence model.

use super::descriptor::RecurrenceKind;

/// A recurrence descriptor whose fields contradict its `kind`.
///
/// Descriptors are authored by administrators, so this is logged by callers
/// and the item is treated as not due.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDescriptor {
    #[error("invalid descriptor: kind '{kind}' requires '{field}'")]
    MissingField {
        kind: RecurrenceKind,
        field: &'static str,
    },

    #[error("invalid descriptor: '{field}' is not allowed for kind '{kind}'")]
    UnexpectedField {
        kind: RecurrenceKind,
        field: &'static str,
    },

    #[error("invalid descriptor: '{field}' out of range ({value}, expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("invalid descriptor: a one-shot item needs exactly one of 'due_date' or 'scheduled_at'")]
    AmbiguousOneShot,

    #[error("invalid descriptor: 'time_of_day' cannot be combined with 'scheduled_at'")]
    TimeWithInstant,

    #[error("invalid descriptor: time of day '{0}' is not HH:MM")]
    BadTimeOfDay(String),
}
