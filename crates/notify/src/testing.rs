//! Test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::traits::{Notification, Notifier, NotifyError};

pub(crate) struct MockNotifier {
    name: String,
    send_count: Arc<AtomicUsize>,
    should_fail: bool,
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotifier {
    pub(crate) fn ok(name: &str, send_count: Arc<AtomicUsize>) -> Self {
        Self {
            name: name.to_string(),
            send_count,
            should_fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing(name: &str, send_count: Arc<AtomicUsize>) -> Self {
        Self {
            should_fail: true,
            ..Self::ok(name, send_count)
        }
    }

    /// Keep a copy of every notification in `sent`.
    pub(crate) fn recording(mut self, sent: Arc<Mutex<Vec<Notification>>>) -> Self {
        self.sent = sent;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(notification.clone());
        if self.should_fail {
            Err(NotifyError::Config("mock failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}
