//! Notifier trait definition and shared error types.

use std::collections::HashMap;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A rendered notification ready for delivery.
///
/// This is the JSON body the push gateway receives.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    /// The rendered title.
    pub subject: String,
    /// The rendered body content.
    pub body: String,
    /// Routing metadata (item id, kind, assignee, fire time).
    pub metadata: HashMap<String, String>,
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Test connectivity with a sample notification.
    async fn test(&self) -> Result<(), NotifyError> {
        let test_notification = Notification {
            subject: "[TESTE] Notificação de teste".to_string(),
            body: "Se você recebeu esta mensagem, o canal de avisos está funcionando.".to_string(),
            metadata: HashMap::from([
                ("item_id".to_string(), "test-item".to_string()),
                ("item_kind".to_string(), "notification".to_string()),
            ]),
        };
        self.send(&test_notification).await
    }

    /// Human-readable name for this channel (e.g., "webhook").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching a notification to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub item_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
