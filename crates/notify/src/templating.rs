//! Minijinja template rendering for notification messages.
//!
//! Item titles and bodies are templates themselves, so an administrator can
//! write `Bom dia, {{ shop.name }}!` or `Meta do dia: {{ 150000 | brl }}`.
//!
//! Templates are arbitrary strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per render call.

use chrono::{DateTime, SecondsFormat, Utc};
use churros_core::format_brl;
use churros_schedule::ScheduledItem;

use crate::traits::NotifyError;

/// Context data available to notification templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateContext {
    /// The item that fired.
    pub item: ItemContext,
    pub shop: ShopContext,
    /// Fire instant in RFC 3339 (UTC).
    pub fired_at: String,
}

/// Item fields exposed to templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ItemContext {
    pub id: String,
    /// `"task"` or `"notification"`.
    pub kind: String,
    pub title: String,
    pub body: Option<String>,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ShopContext {
    pub name: String,
}

impl TemplateContext {
    pub fn new(item: &ScheduledItem, shop_name: &str, fired_at: DateTime<Utc>) -> Self {
        Self {
            item: ItemContext::from(item),
            shop: ShopContext {
                name: shop_name.to_string(),
            },
            fired_at: fired_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl From<&ScheduledItem> for ItemContext {
    fn from(item: &ScheduledItem) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind.to_string(),
            title: item.title.clone(),
            body: item.body.clone(),
            assignee: item.assignee.clone(),
            tags: item.tags.clone(),
        }
    }
}

/// Renders notification templates using minijinja.
#[derive(Debug)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a configured minijinja environment with custom filters and globals.
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();

        env.add_filter("brl", brl_filter);
        // Built in with the "builtins" feature; registered explicitly so they
        // behave the same on every feature set.
        env.add_filter("lower", lower_filter);
        env.add_filter("upper", upper_filter);

        env.add_function("env", env_function);

        env
    }

    /// Render a template string with any serializable context.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the template is invalid or
    /// rendering fails.
    pub fn render<S: serde::Serialize>(
        &self,
        template_str: &str,
        ctx: &S,
    ) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(template_str, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Check that a template string parses, without evaluating it.
    pub fn validate(&self, template_str: &str) -> Result<(), NotifyError> {
        let env = Self::build_env();
        env.template_from_str(template_str)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer cents to `R$ 1.234,56`.
fn brl_filter(cents: i64) -> String {
    format_brl(cents)
}

fn lower_filter(value: String) -> String {
    value.to_lowercase()
}

fn upper_filter(value: String) -> String {
    value.to_uppercase()
}

/// Suffixes of variable names templates may not read.
const SECRET_SUFFIXES: &[&str] = &["_TOKEN", "_SECRET", "_PASSWORD", "_KEY"];

fn is_secret_var(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    SECRET_SUFFIXES.iter().any(|s| upper.ends_with(s))
}

/// Global function: read an environment variable by name.
///
/// Returns an empty string (and logs a warning) when the variable is unset
/// or names a credential. Rendered text goes to customer devices.
fn env_function(name: String) -> String {
    if is_secret_var(&name) {
        tracing::warn!(var = %name, "templates may not read credential variables");
        return String::new();
    }
    match std::env::var(&name) {
        Ok(val) => val,
        Err(_) => {
            tracing::warn!(var = %name, "environment variable not found, returning empty string");
            String::new()
        }
    }
}
