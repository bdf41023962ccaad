//! telealarm - Telegram delivery adapter for map-event alarms.
//!
//! Given per-event placeholder data for one of five categories (monsters,
//! stops, gyms, eggs, raids), this crate renders the category's configured
//! templates and delivers sticker, text, location or venue messages to the
//! Telegram Bot API, with bounded retry on transient failure. All settings
//! are resolved once at startup; delivery itself is stateless.

pub mod cli;
pub mod config;
pub mod event;
pub mod retry;
pub mod telegram;
pub mod template;
pub mod transport;

pub use config::{AlarmConfig, AlertConfig, ConfigError};
pub use event::{EventCategory, EventData};
pub use telegram::{NotifyError, TelegramAlarm};
pub use transport::DeliveryError;
