//! Filesystem schedule loader with hot-reload via `notify` watcher.
//!
//! Each YAML file under the schedules directory (at any depth) holds one
//! [`ScheduledItem`], usually named `<id>.yml`. The watcher reloads changed
//! files into the in-memory item map and drops items whose file is deleted.
//!
//! [`ScheduledItem`]: crate::schema::ScheduledItem

mod core;
mod error;
mod store;
mod watcher;


pub use self::core::ScheduleLoader;
pub use self::error::{LoadResult, LoadStatus};
