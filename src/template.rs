//! Placeholder substitution for alert templates.
//!
//! Templates reference event values with angle-bracket placeholders, e.g.
//! `"A wild <mon_name> has appeared!"`. Rendering replaces every placeholder
//! that has a value in the event data. A placeholder with no value is left
//! literal and logged as a warning; rendering itself never fails, so a stale
//! template cannot take an alarm down.

use crate::event::EventData;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([\w-]+)>").expect("placeholder regex is valid"))
}

/// Substitutes every `<name>` placeholder in `template` with its value from
/// `data`. Unknown placeholders are kept verbatim.
pub fn render(template: &str, data: &EventData) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match data.get(name) {
                Some(value) => value.to_string(),
                None => {
                    warn!(placeholder = name, "no value for template placeholder");
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventData;

    #[test]
    fn substitutes_all_known_placeholders() {
        let data: EventData = [("old_team", "Mystic"), ("new_team", "Valor")]
            .into_iter()
            .collect();
        let rendered = render("Team <old_team> fell to <new_team>", &data);
        assert_eq!(rendered, "Team Mystic fell to Valor");
    }

    #[test]
    fn fully_populated_template_has_no_placeholders_left() {
        let data: EventData = [
            ("mon_name", "Dratini"),
            ("24h_time", "17:45"),
            ("time_left", "12m 30s"),
        ]
        .into_iter()
        .collect();
        let rendered = render(
            "*A wild <mon_name> has appeared!*\nAvailable until <24h_time> (<time_left>).",
            &data,
        );
        assert!(!rendered.contains('<'), "unexpected placeholder in {rendered:?}");
        assert!(rendered.contains("Dratini"));
    }

    #[test]
    fn unknown_placeholder_is_left_literal() {
        let data: EventData = [("mon_name", "Dratini")].into_iter().collect();
        let rendered = render("<mon_name> until <24h_time>", &data);
        assert_eq!(rendered, "Dratini until <24h_time>");
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let data = EventData::new();
        assert_eq!(render("plain text", &data), "plain text");
        assert_eq!(render("", &data), "");
    }

    #[test]
    fn repeated_placeholder_is_substituted_everywhere() {
        let data: EventData = [("egg_lvl", "5")].into_iter().collect();
        let rendered = render("eggs/<egg_lvl>.webp level <egg_lvl>", &data);
        assert_eq!(rendered, "eggs/5.webp level 5");
    }
}
