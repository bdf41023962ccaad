//! Alarm configuration.
//!
//! This module defines the raw configuration structs loaded with `figment`
//! from a `telealarm.toml` file, merged with `TELEALARM_`-prefixed
//! environment variables and command-line arguments, and the resolution of
//! those raw settings into one immutable [`AlertConfig`] per event category.
//!
//! The schema is strict: unrecognized keys at the alarm level or inside a
//! category table are a hard configuration error, not ignored.

use crate::cli::Cli;
use crate::event::EventCategory;
use crate::retry::RetryPolicy;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Default base URL of the Telegram Bot API. Overridable for tests.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Public mirror the built-in sticker templates resolve against.
const IMAGE_URL_BASE: &str = "https://raw.githubusercontent.com/PokeAlarm/Images/master";

/// A fatal configuration problem. Raised at startup; an alarm with a broken
/// configuration is never constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] figment::Error),
    #[error("'{field}' is required and must be non-empty for {scope}")]
    MissingField {
        field: &'static str,
        scope: &'static str,
    },
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// The raw alarm configuration as written by the user. Top-level fields are
/// the alarm-level defaults shared by all categories; each category table
/// may override any of them plus its own templates.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AlarmConfig {
    /// Bot credential used for every send unless a category overrides it.
    #[serde(default)]
    pub bot_token: String,
    /// Destination chat, channel or user id.
    #[serde(default)]
    pub chat_id: String,
    /// Send an "activated" message once at startup.
    #[serde(default = "default_true")]
    pub startup_message: bool,
    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    // Alarm-level defaults for the per-category toggles.
    #[serde(default = "default_true")]
    pub sticker: bool,
    #[serde(default)]
    pub sticker_notify: bool,
    #[serde(default = "default_true")]
    pub message_notify: bool,
    #[serde(default)]
    pub venue: bool,
    #[serde(default = "default_true")]
    pub venue_notify: bool,
    #[serde(default = "default_true")]
    pub map: bool,
    #[serde(default)]
    pub map_notify: bool,
    /// Total send attempts per outbound call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub monsters: AlertOverrides,
    #[serde(default)]
    pub stops: AlertOverrides,
    #[serde(default)]
    pub gyms: AlertOverrides,
    #[serde(default)]
    pub eggs: AlertOverrides,
    #[serde(default)]
    pub raids: AlertOverrides,
}

/// Per-category overrides. Every field is optional; an absent field falls
/// back to the alarm level, then to the built-in default.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct AlertOverrides {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub message: Option<String>,
    pub sticker_url: Option<String>,
    pub sticker: Option<bool>,
    pub sticker_notify: Option<bool>,
    pub message_notify: Option<bool>,
    pub venue: Option<bool>,
    pub venue_notify: Option<bool>,
    pub map: Option<bool>,
    pub map_notify: Option<bool>,
    pub max_attempts: Option<u32>,
}

/// Resolved, immutable settings for one category. Built once at startup and
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Message template; `<placeholder>` names are filled per event.
    pub message: String,
    /// Sticker URL template; an empty rendered URL skips the sticker send.
    pub sticker_url: String,
    pub sticker: bool,
    pub sticker_notify: bool,
    pub message_notify: bool,
    pub venue: bool,
    pub venue_notify: bool,
    pub map: bool,
    pub map_notify: bool,
    pub retry: RetryPolicy,
}

/// The five resolved alert configurations, one per category.
#[derive(Debug, Clone)]
pub struct ResolvedAlerts {
    pub monsters: AlertConfig,
    pub stops: AlertConfig,
    pub gyms: AlertConfig,
    pub eggs: AlertConfig,
    pub raids: AlertConfig,
}

impl ResolvedAlerts {
    pub fn get(&self, category: EventCategory) -> &AlertConfig {
        match category {
            EventCategory::Monsters => &self.monsters,
            EventCategory::Stops => &self.stops,
            EventCategory::Gyms => &self.gyms,
            EventCategory::Eggs => &self.eggs,
            EventCategory::Raids => &self.raids,
        }
    }
}

/// Built-in message and sticker templates per category. The lowest layer of
/// the merge; users override them from the configuration file.
fn builtin_templates(category: EventCategory) -> (&'static str, String) {
    let (message, sticker_path) = match category {
        EventCategory::Monsters => (
            "*A wild <mon_name> has appeared!*\nAvailable until <24h_time> (<time_left>).",
            "monsters/<mon_id_3>_<form_id_3>.webp",
        ),
        EventCategory::Stops => (
            "*Someone has placed a lure on a Pokestop!*\nLure will expire at <24h_time> (<time_left>).",
            "stop/ready.webp",
        ),
        EventCategory::Gyms => (
            "*A Team <old_team> gym has fallen!*\nIt is now controlled by <new_team>.",
            "gyms/<new_team_id>.webp",
        ),
        EventCategory::Eggs => (
            "*A level <egg_lvl> raid is incoming!*\nThe egg will hatch <24h_hatch_time> (<hatch_time_left>).",
            "eggs/<egg_lvl>.webp",
        ),
        EventCategory::Raids => (
            "*A raid is available against <mon_name>!*\nThe raid is available until <24h_raid_end> (<raid_time_left>).",
            "monsters/<mon_id_3>_000.webp",
        ),
    };
    (message, format!("{IMAGE_URL_BASE}/{sticker_path}"))
}

impl AlarmConfig {
    /// Loads the alarm configuration by layering sources: the TOML file,
    /// `TELEALARM_` environment variables, then command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("telealarm.toml"));
        let config: AlarmConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TELEALARM_"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }

    /// Parses a configuration from a TOML string. Used by tests.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: AlarmConfig = Figment::new().merge(Toml::string(toml)).extract()?;
        Ok(config)
    }

    /// Resolves the merged settings into one immutable [`AlertConfig`] per
    /// category. Precedence: per-category override > alarm level > built-in
    /// default. Fails if any resolved alert is missing a credential or a
    /// destination.
    pub fn resolve(&self) -> Result<ResolvedAlerts, ConfigError> {
        if self.bot_token.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bot_token",
                scope: "the alarm level",
            });
        }
        if self.chat_id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "chat_id",
                scope: "the alarm level",
            });
        }

        Ok(ResolvedAlerts {
            monsters: self.resolve_alert(EventCategory::Monsters)?,
            stops: self.resolve_alert(EventCategory::Stops)?,
            gyms: self.resolve_alert(EventCategory::Gyms)?,
            eggs: self.resolve_alert(EventCategory::Eggs)?,
            raids: self.resolve_alert(EventCategory::Raids)?,
        })
    }

    fn overrides(&self, category: EventCategory) -> &AlertOverrides {
        match category {
            EventCategory::Monsters => &self.monsters,
            EventCategory::Stops => &self.stops,
            EventCategory::Gyms => &self.gyms,
            EventCategory::Eggs => &self.eggs,
            EventCategory::Raids => &self.raids,
        }
    }

    fn resolve_alert(&self, category: EventCategory) -> Result<AlertConfig, ConfigError> {
        let overrides = self.overrides(category);
        let (default_message, default_sticker_url) = builtin_templates(category);

        let alert = AlertConfig {
            bot_token: overrides
                .bot_token
                .clone()
                .unwrap_or_else(|| self.bot_token.clone()),
            chat_id: overrides
                .chat_id
                .clone()
                .unwrap_or_else(|| self.chat_id.clone()),
            message: overrides
                .message
                .clone()
                .unwrap_or_else(|| default_message.to_string()),
            sticker_url: overrides.sticker_url.clone().unwrap_or(default_sticker_url),
            sticker: overrides.sticker.unwrap_or(self.sticker),
            sticker_notify: overrides.sticker_notify.unwrap_or(self.sticker_notify),
            message_notify: overrides.message_notify.unwrap_or(self.message_notify),
            venue: overrides.venue.unwrap_or(self.venue),
            venue_notify: overrides.venue_notify.unwrap_or(self.venue_notify),
            map: overrides.map.unwrap_or(self.map),
            map_notify: overrides.map_notify.unwrap_or(self.map_notify),
            retry: RetryPolicy::new(overrides.max_attempts.unwrap_or(self.max_attempts)),
        };

        if alert.bot_token.is_empty() {
            return Err(ConfigError::MissingField {
                field: "bot_token",
                scope: category.key(),
            });
        }
        if alert.chat_id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "chat_id",
                scope: category.key(),
            });
        }

        Ok(alert)
    }
}
