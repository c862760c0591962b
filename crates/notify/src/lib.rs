//! Push delivery for scheduled shop notifications.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - a webhook notifier for the push gateway
//! - Minijinja template rendering for item titles and bodies
//! - Dispatcher that routes notifications to configured channels
//! - `ScheduleRunner`, the evaluate/deliver/record loop behind `notify-worker`

pub mod dispatcher;
pub mod runner;
pub mod templating;
pub mod traits;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::Dispatcher;
pub use runner::ScheduleRunner;
pub use templating::TemplateRenderer;
pub use traits::{Notification, Notifier, NotifyError};
pub use webhook::WebhookNotifier;
