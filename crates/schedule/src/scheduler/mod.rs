//! Per-item scheduling state.
//!
//! Tracks every loaded [`ScheduledItem`](crate::schema::ScheduledItem) with its
//! recurrence descriptor and `last_fired_at`. The [`ItemScheduler`] answers
//! which items are due at an instant; the caller decides what firing means
//! and reports back with [`ItemScheduler::record_fire_at`].

mod core;
mod entry;


pub use self::core::ItemScheduler;
pub use self::entry::ScheduleEntry;
