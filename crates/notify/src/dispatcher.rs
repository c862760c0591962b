//! Routes notifications to configured channels.
//!
//! The dispatcher owns every configured channel. An item that names its
//! channels reaches only those; any other item reaches all of them.
//! Individual channel failures don't block other channels.

use std::collections::HashMap;

use crate::traits::{DispatchResult, Notification, Notifier, NotifyError};

/// Dispatches notifications to multiple channels, organized per item.
pub struct Dispatcher {
    /// Every configured channel, in delivery order.
    channels: Vec<Box<dyn Notifier>>,
    /// Item id → channel names for that item.
    item_channels: HashMap<String, Vec<String>>,
}

impl Dispatcher {
    /// Create a dispatcher over the given channels, shared by all items
    /// until an item names its own.
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self {
            channels,
            item_channels: HashMap::new(),
        }
    }

    /// Create a dispatcher with no channels.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Restrict an item to the named channels. An empty list restores the
    /// fallback to every channel.
    pub fn set_item_channels(&mut self, item_id: impl Into<String>, names: Vec<String>) {
        let item_id = item_id.into();
        for name in &names {
            if !self.channels.iter().any(|c| c.channel_name() == name) {
                tracing::warn!(item_id = %item_id, channel = %name, "item names an unknown channel");
            }
        }
        if names.is_empty() {
            self.item_channels.remove(&item_id);
        } else {
            self.item_channels.insert(item_id, names);
        }
    }

    /// Forget the channel selection of a deleted item.
    pub fn remove_item(&mut self, item_id: &str) {
        self.item_channels.remove(item_id);
    }

    /// Drop the channel selection of every item not in `keep`.
    pub fn retain_items(&mut self, keep: impl Fn(&str) -> bool) {
        self.item_channels.retain(|id, _| keep(id));
    }

    /// Number of channels a dispatch for `item_id` would reach.
    pub fn channel_count(&self, item_id: &str) -> usize {
        self.channels_for(item_id).len()
    }

    fn channels_for(&self, item_id: &str) -> Vec<&dyn Notifier> {
        match self.item_channels.get(item_id) {
            Some(names) => self
                .channels
                .iter()
                .filter(|c| names.iter().any(|n| n == c.channel_name()))
                .map(Box::as_ref)
                .collect(),
            None => self.channels.iter().map(Box::as_ref).collect(),
        }
    }

    /// Dispatch a notification for an item to all its channels.
    ///
    /// Returns one result per channel delivery.
    pub async fn dispatch(
        &self,
        item_id: &str,
        notification: &Notification,
    ) -> Vec<DispatchResult> {
        let channels = self.channels_for(item_id);

        if channels.is_empty() {
            tracing::debug!(item_id, "no notification channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(channels.len());

        for channel in channels {
            let start = std::time::Instant::now();
            let result = channel.send(notification).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        item_id,
                        channel = channel.channel_name(),
                        duration_ms,
                        "notification delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        item_id,
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "notification delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                item_id: item_id.to_string(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }

    /// Send a test notification through one of an item's channels by index.
    pub async fn test_notify(
        &self,
        item_id: &str,
        channel_index: usize,
    ) -> Result<(), NotifyError> {
        let channels = self.channels_for(item_id);
        if channels.is_empty() {
            return Err(NotifyError::Config(format!("no channels for item '{item_id}'")));
        }

        let channel = channels.get(channel_index).ok_or_else(|| {
            NotifyError::Config(format!("channel index {channel_index} out of range"))
        })?;

        channel.test().await
    }
}
