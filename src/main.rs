//! telealarm - Telegram delivery adapter for map-event alarms.
//!
//! Loads the alarm configuration, sends the optional startup message, then
//! reads JSON-lines events from stdin and delivers each one. One event per
//! line: `{"category": "gyms", "old_team": "Mystic", "lat": 40.7, ...}`
//! where every key besides `category` is a template placeholder value.
//! Scalar values of any JSON type are accepted; numbers and booleans are
//! stringified before substitution.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use telealarm::{
    cli::Cli,
    config::AlarmConfig,
    event::{EventCategory, EventData},
    telegram::TelegramAlarm,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// One event as read from stdin.
#[derive(Debug, Deserialize)]
struct InboundEvent {
    category: EventCategory,
    #[serde(flatten)]
    data: EventData,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AlarmConfig::load(&cli).context("failed to load configuration")?;

    info!("telealarm starting up");
    info!(api_url = %config.api_url, "Bot API endpoint");
    info!(chat_id = %config.chat_id, "default destination");
    info!(
        startup_message = config.startup_message,
        max_attempts = config.max_attempts,
        "alarm settings"
    );

    let alarm = TelegramAlarm::new(&config)?;

    if let Err(e) = alarm.startup_message().await {
        // A failed greeting is not fatal; event delivery can still work.
        error!(error = %e, "startup message failed");
    }

    info!("listening for events on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "skipping malformed event line");
                continue;
            }
        };
        if let Err(e) = alarm.notify(event.category, &event.data).await {
            error!(category = %event.category, error = %e, "alert delivery failed");
        }
    }

    info!("event stream closed, exiting");
    Ok(())
}
