//! Per-item schedule entry type.

use chrono::{DateTime, Utc};

use crate::recurrence::RecurrenceDescriptor;
use crate::schema::ItemKind;

/// Scheduling state for a single item.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    /// Item identifier (matches `ScheduledItem.id`).
    pub item_id: String,
    pub kind: ItemKind,
    /// Recurrence rule; `last_fired_at` is the scheduler's own record.
    pub descriptor: RecurrenceDescriptor,
    /// Whether the item takes part in evaluation.
    pub enabled: bool,
}

impl ScheduleEntry {
    /// Timestamp of the last recorded fire.
    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.descriptor.last_fired_at
    }
}
