//! HTTP webhook notifier for the push gateway.
//!
//! Delivers notifications as JSON payloads to the configured gateway URL
//! with optional custom headers and request body templates.

use std::collections::HashMap;
use std::sync::Arc;

use churros_core::config::PushConfig;

use crate::templating::TemplateRenderer;
use crate::traits::{Notification, Notifier, NotifyError};

/// Used when a 429 response carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Delivers notifications as JSON over HTTP to a configured endpoint.
///
/// Environment variable references (`${VAR_NAME}`) in the URL and header
/// values are resolved at construction time.
#[derive(Debug)]
pub struct WebhookNotifier {
    /// Target URL (env vars already resolved).
    url: String,
    method: reqwest::Method,
    /// Custom headers to include on every request.
    headers: HashMap<String, String>,
    /// Optional minijinja body template, rendered with the notification as
    /// context. Without one the notification is sent as JSON.
    body_template: Option<String>,
    renderer: Arc<TemplateRenderer>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier.
    ///
    /// Missing env vars and body templates that do not parse produce a
    /// [`NotifyError::Config`] error. `method` defaults to `POST`.
    pub fn new(
        url: String,
        method: Option<reqwest::Method>,
        headers: HashMap<String, String>,
        body_template: Option<String>,
        renderer: Arc<TemplateRenderer>,
    ) -> Result<Self, NotifyError> {
        let resolved_url = resolve_env_vars(&url)?;

        let mut resolved_headers = HashMap::with_capacity(headers.len());
        for (key, value) in &headers {
            resolved_headers.insert(key.clone(), resolve_env_vars(value)?);
        }

        if let Some(ref tmpl) = body_template {
            renderer
                .validate(tmpl)
                .map_err(|e| NotifyError::Config(format!("invalid body template: {e}")))?;
        }

        Ok(Self {
            url: resolved_url,
            method: method.unwrap_or(reqwest::Method::POST),
            headers: resolved_headers,
            body_template,
            renderer,
            client: reqwest::Client::new(),
        })
    }

    /// Construct a [`WebhookNotifier`] from string-level settings.
    ///
    /// `method` is parsed case-insensitively (e.g. `"post"`, `"PUT"`).
    pub fn from_config(
        url: String,
        method: Option<String>,
        headers: Option<HashMap<String, String>>,
        body_template: Option<String>,
        renderer: Arc<TemplateRenderer>,
    ) -> Result<Self, NotifyError> {
        let parsed_method = match method {
            Some(m) => {
                let upper = m.to_uppercase();
                upper
                    .parse::<reqwest::Method>()
                    .map(Some)
                    .map_err(|_| NotifyError::Config(format!("invalid HTTP method: {m}")))?
            }
            None => None,
        };

        Self::new(
            url,
            parsed_method,
            headers.unwrap_or_default(),
            body_template,
            renderer,
        )
    }

    /// Build the push gateway channel from the `push` config section.
    ///
    /// A configured auth token becomes an `Authorization: Bearer` header.
    pub fn from_push_config(
        push: &PushConfig,
        renderer: Arc<TemplateRenderer>,
    ) -> Result<Self, NotifyError> {
        let url = push
            .webhook_url
            .clone()
            .ok_or_else(|| NotifyError::Config("PUSH_WEBHOOK_URL is not set".to_string()))?;

        let mut headers = HashMap::new();
        if let Some(token) = &push.auth_token {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }

        Self::from_config(url, Some(push.method.clone()), Some(headers), None, renderer)
    }

    fn request_body(&self, notification: &Notification) -> Result<String, NotifyError> {
        match &self.body_template {
            Some(tmpl) => self.renderer.render(tmpl, notification),
            None => serde_json::to_string(notification).map_err(|e| {
                NotifyError::Config(format!("failed to serialize notification: {e}"))
            }),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let body = self.request_body(notification)?;

        let mut request = self
            .client
            .request(self.method.clone(), &self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            tracing::warn!(url = %self.url, retry_after_secs, "push gateway rate limited the request");
            return Err(NotifyError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                body = %body_text,
                "webhook returned non-2xx status"
            );
            return Err(NotifyError::Config(format!(
                "webhook returned {status}: {body_text}"
            )));
        }

        tracing::debug!(
            url = %self.url,
            method = %self.method,
            status = %status,
            "webhook notification delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// Seconds from a `Retry-After` header; only the delta-seconds form is read.
fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();
        let mut var_name = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            var_name.push(c);
        }
        if !closed {
            return Err(NotifyError::Config(format!(
                "unclosed env var reference in: {input}"
            )));
        }
        let value = std::env::var(&var_name)
            .map_err(|_| NotifyError::Config(format!("env var not found: {var_name}")))?;
        result.push_str(&value);
    }

    Ok(result)
}
