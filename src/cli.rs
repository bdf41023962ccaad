//! Command-line argument parsing.
//!
//! Arguments are parsed with `clap` at startup and merged into the figment
//! configuration layering, on top of the TOML file and environment
//! variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Telegram delivery adapter for map-event alarms.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging filter, e.g. "info" or "telealarm=debug". Overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Skip the startup message even if the configuration enables it.
    #[arg(long)]
    pub no_startup_message: bool,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        // `log_level` stays out of the config schema; main reads it directly.
        if self.no_startup_message {
            dict.insert("startup_message".into(), Value::from(false));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlarmConfig;
    use figment::{providers::Format, providers::Toml, Figment};

    #[test]
    fn no_startup_message_flag_overrides_the_file() {
        let cli = Cli {
            no_startup_message: true,
            ..Cli::default()
        };
        let config: AlarmConfig = Figment::new()
            .merge(Toml::string(
                r#"
                bot_token = "123:abc"
                chat_id = "@alerts"
                startup_message = true
                "#,
            ))
            .merge(cli)
            .extract()
            .unwrap();
        assert!(!config.startup_message);
    }

    #[test]
    fn absent_flag_leaves_the_file_value_alone() {
        let cli = Cli::default();
        let config: AlarmConfig = Figment::new()
            .merge(Toml::string(
                r#"
                bot_token = "123:abc"
                chat_id = "@alerts"
                "#,
            ))
            .merge(cli)
            .extract()
            .unwrap();
        assert!(config.startup_message);
    }
}
