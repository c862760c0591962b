//! Schedule item definitions: the YAML documents administrators author.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceDescriptor;

/// What a scheduled item produces when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// An employee task; date-only.
    Task,
    /// A push notification; may carry a time of day.
    Notification,
}

impl ItemKind {
    pub const NAMES: &'static [&'static str] = &["task", "notification"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Notification => "notification",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task or notification together with its recurrence.
///
/// ```yaml
/// id: fryer-oil-check
/// kind: task
/// title: Check fryer oil
/// assignee: cozinha
/// recurrence:
///   kind: weekly
///   day_of_week: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Delivery channels by name. Empty means every configured channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
    pub recurrence: RecurrenceDescriptor,
}

fn default_enabled() -> bool {
    true
}

impl ScheduledItem {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
