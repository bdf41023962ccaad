//! Event categories and the per-firing placeholder data they carry.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The five event kinds an alarm can fire for. Each category has its own
/// resolved alert settings and templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Monsters,
    Stops,
    Gyms,
    Eggs,
    Raids,
}

impl EventCategory {
    /// All categories, in the order they are resolved at startup.
    pub const ALL: [EventCategory; 5] = [
        EventCategory::Monsters,
        EventCategory::Stops,
        EventCategory::Gyms,
        EventCategory::Eggs,
        EventCategory::Raids,
    ];

    /// The key this category uses in the configuration file.
    pub fn key(&self) -> &'static str {
        match self {
            EventCategory::Monsters => "monsters",
            EventCategory::Stops => "stops",
            EventCategory::Gyms => "gyms",
            EventCategory::Eggs => "eggs",
            EventCategory::Raids => "raids",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The placeholder values for one event firing, produced upstream and
/// consumed once. Keys correspond to `<placeholder>` names in templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventData(HashMap<String, String>);

impl<'de> Deserialize<'de> for EventData {
    /// Placeholder values are stored as strings, but upstream emitters often
    /// produce numeric JSON (`"lat": 40.7`). Scalars are accepted and
    /// stringified; nested objects and arrays are rejected.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(de::Error::custom(format!(
                        "placeholder '{key}' must be a scalar value, got {other}"
                    )))
                }
            };
            values.insert(key, value);
        }
        Ok(Self(values))
    }
}

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the value for a placeholder name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// The event's latitude/longitude pair, if both are present and numeric.
    /// Location and venue sends require coordinates; text and sticker sends
    /// do not.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.get("lat")?.parse().ok()?;
        let lng = self.get("lng")?.parse().ok()?;
        Some((lat, lng))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EventData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
