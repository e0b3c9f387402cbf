use crate::commentary::PersonalityMode;
use crate::state::tracker::{Cadence, LIVE_POLL, REPLAY_STEP};
use log::LevelFilter;
use mlb_api::client::STATSAPI_BASE;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_base: String,
    pub cadence: Cadence,
    pub feed_timeout: Duration,
    pub mode: PersonalityMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_base: STATSAPI_BASE.to_string(),
            cadence: Cadence::default(),
            feed_timeout: DEFAULT_TIMEOUT,
            mode: PersonalityMode::default(),
        }
    }
}

impl AppSettings {
    /// Read `BALLBUDDY_*` environment variables. Anything missing or
    /// unparsable keeps its default.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let positive = |key: &str| value(key).and_then(|v| v.parse::<u64>().ok()).filter(|n| *n > 0);

        let defaults = Self::default();
        Self {
            full_screen: false,
            log_level: value("BALLBUDDY_LOG").and_then(|v| v.parse::<LevelFilter>().ok()),
            api_base: value("BALLBUDDY_API_BASE").unwrap_or(defaults.api_base),
            cadence: Cadence {
                replay: positive("BALLBUDDY_REPLAY_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(REPLAY_STEP),
                live: positive("BALLBUDDY_POLL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(LIVE_POLL),
            },
            feed_timeout: positive("BALLBUDDY_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.feed_timeout),
            mode: value("BALLBUDDY_MODE")
                .and_then(|v| PersonalityMode::from_id(&v))
                .unwrap_or(defaults.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let settings = settings_from(&[]);
        assert_eq!(settings.api_base, STATSAPI_BASE);
        assert_eq!(settings.cadence, Cadence::default());
        assert_eq!(settings.feed_timeout, Duration::from_secs(10));
        assert_eq!(settings.mode, PersonalityMode::Casual);
        assert_eq!(settings.log_level, None);
    }

    #[test]
    fn environment_overrides() {
        let settings = settings_from(&[
            ("BALLBUDDY_API_BASE", "http://localhost:8080"),
            ("BALLBUDDY_POLL_SECS", "5"),
            ("BALLBUDDY_REPLAY_MS", "1500"),
            ("BALLBUDDY_TIMEOUT_SECS", "3"),
            ("BALLBUDDY_MODE", "history"),
            ("BALLBUDDY_LOG", "debug"),
        ]);
        assert_eq!(settings.api_base, "http://localhost:8080");
        assert_eq!(settings.cadence.live, Duration::from_secs(5));
        assert_eq!(settings.cadence.replay, Duration::from_millis(1500));
        assert_eq!(settings.feed_timeout, Duration::from_secs(3));
        assert_eq!(settings.mode, PersonalityMode::History);
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn bad_values_fall_back() {
        let settings = settings_from(&[
            ("BALLBUDDY_POLL_SECS", "0"),
            ("BALLBUDDY_REPLAY_MS", "soon"),
            ("BALLBUDDY_MODE", "grumpy"),
            ("BALLBUDDY_LOG", "loud"),
            ("BALLBUDDY_API_BASE", "  "),
        ]);
        assert_eq!(settings.cadence, Cadence::default());
        assert_eq!(settings.mode, PersonalityMode::Casual);
        assert_eq!(settings.log_level, None);
        assert_eq!(settings.api_base, STATSAPI_BASE);
    }
}
