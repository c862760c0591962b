//! Recurring task and notification scheduling for the shop back office.
//!
//! This crate provides:
//! - the recurrence model and its pure evaluator (`is_due`)
//! - YAML item definitions with validation and "did you mean" suggestions
//! - a filesystem loader with hot-reload via `notify` watcher
//! - per-item scheduling state and a persisted JSON-lines fire log

pub mod error;
pub mod fire_log;
pub mod loader;
pub mod recurrence;
pub mod scheduler;
pub mod schema;
pub mod validation;

pub use error::{Result, ScheduleError};
pub use fire_log::{FireLog, FireQuery, FireRecord};
pub use loader::{LoadResult, LoadStatus, ScheduleLoader};
pub use recurrence::{is_due, RecurrenceDescriptor, RecurrenceRecord};
pub use scheduler::ItemScheduler;
pub use schema::{ItemKind, ScheduledItem};
