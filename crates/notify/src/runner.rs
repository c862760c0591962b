//! The fire loop: evaluate, render, deliver, record.
//!
//! [`ScheduleRunner`] owns the scheduling state between ticks. The caller
//! supplies the item snapshot and the clock; one [`tick`](ScheduleRunner::tick)
//! fires every due item once.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use churros_schedule::{FireLog, FireRecord, ItemScheduler, ScheduledItem};
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::templating::{TemplateContext, TemplateRenderer};
use crate::traits::{Notification, NotifyError};

/// Channel name recorded when an item's own templates fail to render.
pub const TEMPLATE_CHANNEL: &str = "template";

pub struct ScheduleRunner {
    scheduler: ItemScheduler,
    items: HashMap<String, ScheduledItem>,
    dispatcher: Dispatcher,
    renderer: Arc<TemplateRenderer>,
    fire_log: FireLog,
    shop_name: String,
}

impl ScheduleRunner {
    pub fn new(
        dispatcher: Dispatcher,
        fire_log: FireLog,
        renderer: Arc<TemplateRenderer>,
        shop_name: impl Into<String>,
    ) -> Self {
        Self {
            scheduler: ItemScheduler::new(),
            items: HashMap::new(),
            dispatcher,
            renderer,
            fire_log,
            shop_name: shop_name.into(),
        }
    }

    /// Replace the item set, keeping recorded fire history.
    ///
    /// Each item's channel selection is handed to the dispatcher; items that
    /// disappeared lose theirs.
    pub fn sync_items(&mut self, items: Vec<ScheduledItem>) {
        self.scheduler.sync_items(&items);
        self.items = items.into_iter().map(|i| (i.id.clone(), i)).collect();

        self.dispatcher.retain_items(|id| self.items.contains_key(id));
        for item in self.items.values() {
            self.dispatcher
                .set_item_channels(item.id.clone(), item.channels.clone());
        }
    }

    /// Seed `last_fired_at` from the fire log. Returns the number of items
    /// the log knows about.
    pub fn restore_from_log(&mut self) -> usize {
        let last = self.fire_log.last_fired();
        self.scheduler.restore_last_fired(&last);
        last.len()
    }

    /// Render an item's title and body into a deliverable notification.
    pub fn render(
        &self,
        item: &ScheduledItem,
        fired_at: DateTime<Utc>,
    ) -> Result<Notification, NotifyError> {
        let ctx = TemplateContext::new(item, &self.shop_name, fired_at);
        let subject = self.renderer.render(&item.title, &ctx)?;
        let body = match &item.body {
            Some(body) => self.renderer.render(body, &ctx)?,
            None => String::new(),
        };

        let mut metadata = HashMap::from([
            ("item_id".to_string(), item.id.clone()),
            ("item_kind".to_string(), item.kind.to_string()),
            ("fired_at".to_string(), ctx.fired_at.clone()),
        ]);
        if let Some(assignee) = &item.assignee {
            metadata.insert("assignee".to_string(), assignee.clone());
        }

        Ok(Notification {
            subject,
            body,
            metadata,
        })
    }

    /// Fire every item due at `now`, in id order.
    ///
    /// A fire is recorded even when no channel accepted it, so a broken
    /// channel produces one failed record per window rather than a retry on
    /// every tick.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Vec<FireRecord> {
        let due: Vec<String> = self
            .scheduler
            .due_items(now)
            .into_iter()
            .map(String::from)
            .collect();

        let mut fired = Vec::with_capacity(due.len());

        for id in due {
            let Some(item) = self.items.get(&id) else {
                continue;
            };
            let mut record = FireRecord::new(id.as_str(), item.kind, now);

            match self.render(item, now) {
                Ok(notification) => {
                    for result in self.dispatcher.dispatch(&id, &notification).await {
                        if result.success {
                            record.channels_ok.push(result.channel);
                        } else {
                            record.channels_failed.push(result.channel);
                        }
                    }
                }
                Err(e) => {
                    warn!(item_id = %id, error = %e, "failed to render item templates");
                    record.channels_failed.push(TEMPLATE_CHANNEL.to_string());
                }
            }

            if record.all_failed() {
                warn!(item_id = %id, failed = ?record.channels_failed, "no channel accepted the notification");
            }

            self.scheduler.record_fire_at(&id, now);
            if let Err(e) = self.fire_log.append(record.clone()) {
                warn!(item_id = %id, error = %e, "failed to append to fire log");
            }

            info!(
                item_id = %id,
                kind = %record.item_kind,
                fired_at = %now.to_rfc3339_opts(SecondsFormat::Secs, true),
                ok = record.channels_ok.len(),
                failed = record.channels_failed.len(),
                "item fired"
            );
            fired.push(record);
        }

        fired
    }

    pub fn scheduler(&self) -> &ItemScheduler {
        &self.scheduler
    }

    pub fn fire_log(&self) -> &FireLog {
        &self.fire_log
    }
}
