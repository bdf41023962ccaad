//! The Telegram delivery adapter.
//!
//! [`TelegramAlarm`] owns the five resolved alert configurations and a
//! shared [`Transport`]. One call to [`TelegramAlarm::notify`] turns one
//! event into zero or more outbound Bot API calls, in a fixed order:
//! sticker (when enabled and the rendered URL is non-empty), then either a
//! venue message (exclusive of everything that follows) or a text message,
//! then a location message when the map toggle is on.
//!
//! Sub-sends of one event are independent: a failed sticker does not
//! suppress the text message. The first failure is remembered and returned
//! once the remaining sends have been attempted.

use crate::config::{AlarmConfig, AlertConfig, ResolvedAlerts};
use crate::event::{EventCategory, EventData};
use crate::retry::{retry, RetryPolicy};
use crate::template::render;
use crate::transport::{DeliveryError, Transport};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info};

/// A failed alert delivery. One category's failure never blocks another.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("event data has no usable coordinates for the {0} send")]
    MissingCoordinates(&'static str),
}

/// The delivery adapter. Immutable after construction and safe to share
/// across tasks; concurrent events only read the resolved settings and the
/// pooled HTTP client.
pub struct TelegramAlarm {
    alerts: ResolvedAlerts,
    startup_message: bool,
    bot_token: String,
    chat_id: String,
    api_url: String,
    transport: Transport,
}

impl TelegramAlarm {
    /// Resolves the configuration and builds the adapter. Fails on a broken
    /// configuration; a half-configured alarm is never constructed.
    pub fn new(config: &AlarmConfig) -> anyhow::Result<Self> {
        let alerts = config.resolve()?;
        let transport = Transport::new()?;
        info!("Telegram alarm created");
        Ok(Self {
            alerts,
            startup_message: config.startup_message,
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            transport,
        })
    }

    fn endpoint(&self, bot_token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, bot_token, method)
    }

    /// Sends the one-time "activated" message, if enabled.
    pub async fn startup_message(&self) -> Result<(), NotifyError> {
        if !self.startup_message {
            return Ok(());
        }
        self.send_message(
            &self.bot_token,
            &self.chat_id,
            "telealarm activated!",
            true,
            &RetryPolicy::default(),
        )
        .await?;
        info!("startup message sent");
        Ok(())
    }

    /// Delivers one event for `category`.
    pub async fn notify(
        &self,
        category: EventCategory,
        data: &EventData,
    ) -> Result<(), NotifyError> {
        let alert = self.alerts.get(category);
        let bot_token = render(&alert.bot_token, data);
        let chat_id = render(&alert.chat_id, data);
        let text = render(&alert.message, data);
        let sticker_url = render(&alert.sticker_url, data);
        debug!(%category, %sticker_url, "dispatching alert");

        let mut first_error: Option<NotifyError> = None;

        if alert.sticker && !sticker_url.is_empty() {
            if let Err(e) = self
                .send_sticker(&bot_token, &chat_id, &sticker_url, alert)
                .await
            {
                error!(%category, error = %e, "sticker send failed");
                first_error.get_or_insert(e);
            }
        }

        if alert.venue {
            // Venue mode is exclusive: no text message, no location.
            if let Err(e) = self.send_venue(&bot_token, &chat_id, &text, data, alert).await {
                error!(%category, error = %e, "venue send failed");
                first_error.get_or_insert(e);
            }
            return first_error.map_or(Ok(()), Err);
        }

        if let Err(e) = self
            .send_message(
                &bot_token,
                &chat_id,
                &text,
                alert.message_notify,
                &alert.retry,
            )
            .await
        {
            error!(%category, error = %e, "message send failed");
            first_error.get_or_insert(e);
        }

        if alert.map {
            if let Err(e) = self.send_location(&bot_token, &chat_id, data, alert).await {
                error!(%category, error = %e, "location send failed");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    async fn post_with_retry(
        &self,
        url: &str,
        method: &'static str,
        payload: &Value,
        policy: &RetryPolicy,
    ) -> Result<(), DeliveryError> {
        retry(policy, method, || self.transport.post(url, payload)).await
    }

    async fn send_sticker(
        &self,
        bot_token: &str,
        chat_id: &str,
        sticker_url: &str,
        alert: &AlertConfig,
    ) -> Result<(), NotifyError> {
        let url = self.endpoint(bot_token, "sendSticker");
        let payload = json!({
            "chat_id": chat_id,
            "sticker": sticker_url,
            "disable_notification": !alert.sticker_notify,
        });
        self.post_with_retry(&url, "sendSticker", &payload, &alert.retry)
            .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        notify: bool,
        policy: &RetryPolicy,
    ) -> Result<(), NotifyError> {
        let url = self.endpoint(bot_token, "sendMessage");
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": false,
            "disable_notification": !notify,
        });
        self.post_with_retry(&url, "sendMessage", &payload, policy)
            .await?;
        Ok(())
    }

    async fn send_location(
        &self,
        bot_token: &str,
        chat_id: &str,
        data: &EventData,
        alert: &AlertConfig,
    ) -> Result<(), NotifyError> {
        let (latitude, longitude) = data
            .coordinates()
            .ok_or(NotifyError::MissingCoordinates("location"))?;
        let url = self.endpoint(bot_token, "sendLocation");
        let payload = json!({
            "chat_id": chat_id,
            "latitude": latitude,
            "longitude": longitude,
            "disable_notification": !alert.map_notify,
        });
        self.post_with_retry(&url, "sendLocation", &payload, &alert.retry)
            .await?;
        Ok(())
    }

    /// Sends the venue variant: coordinates plus the rendered message split
    /// into a title (first line) and an address (the rest).
    async fn send_venue(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        data: &EventData,
        alert: &AlertConfig,
    ) -> Result<(), NotifyError> {
        let (latitude, longitude) = data
            .coordinates()
            .ok_or(NotifyError::MissingCoordinates("venue"))?;
        let (title, address) = match text.split_once('\n') {
            Some((title, address)) => (title, address),
            None => (text, ""),
        };
        let url = self.endpoint(bot_token, "sendVenue");
        let payload = json!({
            "chat_id": chat_id,
            "latitude": latitude,
            "longitude": longitude,
            "title": title,
            "address": address,
            "disable_notification": !alert.venue_notify,
        });
        self.post_with_retry(&url, "sendVenue", &payload, &alert.retry)
            .await?;
        Ok(())
    }
}
