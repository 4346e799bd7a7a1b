use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token for the messaging API; notifications are only logged without it
    pub telegram_bot_token: Option<String>,
    /// JSON file backing the store
    pub database_path: PathBuf,
    /// Public page listing the sheriff's fixed property sales
    pub source_page_url: String,
    /// Calendar widget endpoint returning the sale events as JSON
    pub calendar_data_url: String,
    /// Base used to resolve relative links found on the calendar
    pub source_base_url: String,
    /// Timeout for every HTTP request
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            database_path: PathBuf::from("auction_scout.json"),
            source_page_url: "https://www.sheroot.co.za/fixed-property-sales.html".to_string(),
            calendar_data_url: "https://inffuse.eventscalendar.co/js/v0.1/calendar/data"
                .to_string(),
            source_base_url: "https://www.sheroot.co.za".to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load settings, falling back to defaults for anything unset
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            None => defaults.http_timeout,
        };

        Ok(Self {
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            database_path: non_empty("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            source_page_url: non_empty("SOURCE_PAGE_URL").unwrap_or(defaults.source_page_url),
            calendar_data_url: non_empty("CALENDAR_DATA_URL")
                .unwrap_or(defaults.calendar_data_url),
            source_base_url: non_empty("SOURCE_BASE_URL").unwrap_or(defaults.source_base_url),
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert!(config.telegram_bot_token.is_none());
        assert_eq!(config.database_path, PathBuf::from("auction_scout.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("DATABASE_PATH", "/tmp/scout.json"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("SOURCE_BASE_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.telegram_bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/scout.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.source_base_url, "https://www.sheroot.co.za");
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])).is_err());
    }
}
