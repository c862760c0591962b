use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub shop: ShopConfig,
    pub scheduler: SchedulerConfig,
    pub push: PushConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CHURROS_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CHURROS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            shop: ShopConfig::from_env_profiled(p),
            scheduler: SchedulerConfig::from_env_profiled(p),
            push: PushConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  shop:       name={}", self.shop.name);
        tracing::info!(
            "  scheduler:  schedules_dir={}, fire_log={}, poll={}s",
            self.scheduler.schedules_dir.display(),
            self.scheduler.fire_log_path.display(),
            self.scheduler.poll_interval_secs
        );
        tracing::info!(
            "  push:       webhook={}, auth={}",
            self.push.webhook_url.as_deref().unwrap_or("(none)"),
            if self.push.auth_token.is_some() { "set" } else { "unset" }
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "shop": { "name": self.shop.name },
            "scheduler": {
                "schedules_dir": self.scheduler.schedules_dir,
                "fire_log_path": self.scheduler.fire_log_path,
                "poll_interval_secs": self.scheduler.poll_interval_secs,
                "fire_log_max_entries": self.scheduler.fire_log_max_entries,
            },
            "push": {
                "webhook_url": self.push.webhook_url,
                "method": self.push.method,
                "configured": self.push.is_configured(),
            },
        })
    }
}

// ── Shop ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub name: String,
}

impl ShopConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            name: profiled_env_or(p, "SHOP_NAME", "Churrosteria"),
        }
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub schedules_dir: PathBuf,
    pub fire_log_path: PathBuf,
    pub poll_interval_secs: u64,
    pub fire_log_max_entries: usize,
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            schedules_dir: PathBuf::from(profiled_env_or(p, "SCHEDULES_DIR", "data/schedules")),
            fire_log_path: PathBuf::from(profiled_env_or(
                p,
                "FIRE_LOG_PATH",
                "data/fire-log.jsonl",
            )),
            // The evaluator's minute tolerance assumes roughly one poll per minute.
            poll_interval_secs: profiled_env_u64(p, "POLL_INTERVAL_SECS", 60).max(1),
            fire_log_max_entries: profiled_env_usize(p, "FIRE_LOG_MAX_ENTRIES", 500),
        }
    }
}

// ── Push gateway ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub webhook_url: Option<String>,
    pub method: String,
    pub auth_token: Option<String>,
}

impl PushConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "PUSH_WEBHOOK_URL"),
            method: profiled_env_or(p, "PUSH_WEBHOOK_METHOD", "POST"),
            auth_token: profiled_env_opt(p, "PUSH_AUTH_TOKEN"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }
}
