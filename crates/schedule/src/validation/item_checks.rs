//! Identity checks: id, title, assignee, channels.

use crate::schema::ScheduledItem;

use super::fuzzy::{is_slug, slugify};
use super::ValidationResult;

pub(super) fn validate_identity(item: &ScheduledItem, result: &mut ValidationResult) {
    if item.id.is_empty() {
        result.error("id", "Item id must not be empty");
    } else if !is_slug(&item.id) {
        let suggestion = slugify(&item.id);
        let message = format!(
            "Item id '{}' must be lowercase letters and digits separated by '-' or '_'",
            item.id
        );
        if suggestion.is_empty() {
            result.error("id", message);
        } else {
            result.error_with_suggestion("id", message, format!("Did you mean '{suggestion}'?"));
        }
    }

    if item.title.trim().is_empty() {
        result.error("title", "Title must not be empty");
    }

    if let Some(assignee) = &item.assignee {
        if assignee.trim().is_empty() {
            result.warn("assignee", "Assignee is blank; the task will be unassigned");
        }
    }

    for (i, channel) in item.channels.iter().enumerate() {
        if channel.trim().is_empty() {
            result.error(format!("channels[{i}]"), "Channel name must not be empty");
        } else if item.channels[..i].contains(channel) {
            result.warn(format!("channels[{i}]"), format!("Channel '{channel}' is listed twice"));
        }
    }
}
