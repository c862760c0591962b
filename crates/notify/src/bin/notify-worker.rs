//! notify-worker — polls the schedule and delivers due notifications.
//!
//! Loads item definitions from the schedules directory (hot-reloaded),
//! restores fire history from the fire log, then ticks every poll interval:
//! re-sync items, fire whatever is due, append to the fire log.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use churros_core::config::{load_dotenv, Config};
use churros_notify::{Dispatcher, Notifier, ScheduleRunner, TemplateRenderer, WebhookNotifier};
use churros_schedule::{FireLog, LoadStatus, ScheduleLoader};

// ── CLI ─────────────────────────────────────────────────────────────

/// Schedule worker: fires recurring tasks and notifications to the push gateway.
#[derive(Parser, Debug)]
#[command(name = "notify-worker", version, about)]
struct Cli {
    /// Schedules directory (overrides SCHEDULES_DIR).
    #[arg(long)]
    schedules_dir: Option<PathBuf>,

    /// Fire log path (overrides FIRE_LOG_PATH).
    #[arg(long)]
    fire_log: Option<PathBuf>,

    /// Seconds between ticks (overrides POLL_INTERVAL_SECS).
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Run a single tick and exit.
    #[arg(long)]
    once: bool,

    /// Send a test notification through the push gateway and exit.
    #[arg(long)]
    test_push: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.schedules_dir {
        config.scheduler.schedules_dir = dir;
    }
    if let Some(path) = cli.fire_log {
        config.scheduler.fire_log_path = path;
    }
    if let Some(secs) = cli.poll_interval {
        config.scheduler.poll_interval_secs = secs.max(1);
    }
    config.log_summary();

    let renderer = Arc::new(TemplateRenderer::new());
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
    if config.push.is_configured() {
        let webhook = WebhookNotifier::from_push_config(&config.push, Arc::clone(&renderer))
            .context("failed to configure push gateway")?;
        channels.push(Box::new(webhook));
    } else {
        warn!("PUSH_WEBHOOK_URL not set; fires will be logged but not delivered");
    }
    let dispatcher = Dispatcher::new(channels);

    if cli.test_push {
        dispatcher
            .test_notify("test-item", 0)
            .await
            .context("test notification failed")?;
        info!("test notification delivered");
        return Ok(());
    }

    let mut loader = ScheduleLoader::new(config.scheduler.schedules_dir.clone());
    let results = loader.load_all().context("failed to scan schedules directory")?;
    let loaded = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Loaded { .. }))
        .count();
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    info!(loaded, failed, dir = %loader.schedules_dir().display(), "schedules loaded");

    let fire_log = FireLog::open(
        &config.scheduler.fire_log_path,
        config.scheduler.fire_log_max_entries,
    )
    .with_context(|| format!("failed to open fire log {}", config.scheduler.fire_log_path.display()))?;

    let mut runner = ScheduleRunner::new(dispatcher, fire_log, renderer, config.shop.name.clone());
    runner.sync_items(loader.items());
    let restored = runner.restore_from_log();
    info!(restored, "restored fire history");

    if cli.once {
        let fired = runner.tick(Utc::now()).await;
        info!(fired = fired.len(), "single tick complete");
        return Ok(());
    }

    loader.watch().context("failed to watch schedules directory")?;

    let mut interval = tokio::time::interval(Duration::from_secs(config.scheduler.poll_interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(poll_interval_secs = config.scheduler.poll_interval_secs, "notify-worker starting");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                runner.sync_items(loader.items());
                runner.tick(Utc::now()).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }
    info!("notify-worker exited cleanly");

    Ok(())
}
