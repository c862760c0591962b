//! [`ItemScheduler`]: scheduling state for all loaded items.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::recurrence::{is_due, matches_date};
use crate::schema::{ItemKind, ScheduledItem};

use super::entry::ScheduleEntry;

/// Tracks every loaded item and its fire history.
///
/// Call [`sync_items`](ItemScheduler::sync_items) whenever the item set changes
/// (e.g. after hot-reload). Use [`due_items`](ItemScheduler::due_items) from the
/// tick loop to find which items fire.
pub struct ItemScheduler {
    entries: HashMap<String, ScheduleEntry>,
}

impl ItemScheduler {
    /// Create a new empty scheduler.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Synchronize entries with the current set of loaded items.
    ///
    /// - Adds entries for new items.
    /// - Updates rule/kind/enabled for changed items, keeping the later of the
    ///   tracked and the file-provided `last_fired_at`.
    /// - Removes entries for items no longer present.
    ///
    /// Items whose descriptor breaks an invariant are dropped with a warning.
    pub fn sync_items(&mut self, items: &[ScheduledItem]) {
        let current_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        self.entries.retain(|id, _| current_ids.contains(id.as_str()));

        for item in items {
            if let Err(e) = item.recurrence.validate() {
                warn!(item_id = %item.id, error = %e, "invalid recurrence descriptor, not scheduling item");
                self.entries.remove(&item.id);
                continue;
            }

            let mut descriptor = item.recurrence.clone();
            if let Some(entry) = self.entries.get(&item.id) {
                descriptor.last_fired_at = entry.last_fired().max(descriptor.last_fired_at);
            }

            self.entries.insert(
                item.id.clone(),
                ScheduleEntry {
                    item_id: item.id.clone(),
                    kind: item.kind,
                    descriptor,
                    enabled: item.enabled,
                },
            );
        }
    }

    /// Whether a single item fires at the given instant.
    ///
    /// Returns `false` if the item is unknown or disabled.
    pub fn should_fire(&self, item_id: &str, now: DateTime<Utc>) -> bool {
        let Some(entry) = self.entries.get(item_id) else {
            return false;
        };
        if !entry.enabled {
            return false;
        }
        let due = is_due(&entry.descriptor, now);
        debug!(item_id = %item_id, kind = %entry.kind, due, "evaluated item");
        due
    }

    /// Ids of all items that fire at `now`, sorted.
    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .keys()
            .filter(|id| self.should_fire(id, now))
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Record that an item fired at a specific timestamp.
    pub fn record_fire_at(&mut self, item_id: &str, at: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(item_id) {
            entry.descriptor.last_fired_at = Some(at);
        }
    }

    /// Seed `last_fired_at` from a persisted history, e.g. after a restart.
    ///
    /// Never moves a tracked timestamp backwards.
    pub fn restore_last_fired(&mut self, last_fired: &HashMap<String, DateTime<Utc>>) {
        for (id, at) in last_fired {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.descriptor.last_fired_at = entry.last_fired().max(Some(*at));
            }
        }
    }

    /// Enabled tasks whose rule matches `date`, sorted by id.
    ///
    /// This is the "today's tasks" list; it ignores time of day and fire history.
    pub fn tasks_due_on(&self, date: NaiveDate) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .values()
            .filter(|e| e.enabled && e.kind == ItemKind::Task)
            .filter(|e| matches_date(&e.descriptor, date))
            .map(|e| e.item_id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Get a reference to an entry by item id.
    pub fn get(&self, item_id: &str) -> Option<&ScheduleEntry> {
        self.entries.get(item_id)
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scheduler has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ItemScheduler {
    fn default() -> Self {
        Self::new()
    }
}
