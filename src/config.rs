use crate::components::message::{DEFAULT_LOCALE, SUPPORTED_LOCALES};
use crate::components::notification_state::DEFAULT_RETENTION_DAYS;
use crate::error::{config_error, NotifierResult};
use crate::utils::time::resolve_timezone;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use tracing::warn;
use url::Url;

/// Default location of the notification state file
pub const DEFAULT_STATE_FILE: &str = "state/notifications.json";

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// iCalendar feed to poll
    pub feed_url: Url,
    /// Incoming webhook receiving `{"text": ...}`
    pub webhook_url: Url,
    /// Lookahead window in minutes
    pub window_minutes: u32,
    /// Zone used to display event times
    pub timezone: Tz,
    /// Upper bound on events per notification
    pub max_events: Option<usize>,
    /// Where notified event UIDs are kept between runs
    pub state_file: PathBuf,
    /// Message language
    pub locale: String,
    /// Days a state entry is kept after its event started
    pub retention_days: u32,
}

impl Config {
    /// Load configuration from the environment, after reading `.env` if present
    pub fn load() -> NotifierResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> NotifierResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        // Current name first, then the name older deployments used
        let get_either = |key: &str, legacy: &str| get(key).or_else(|| get(legacy));

        let feed_url = get_either("FEED_URL", "ICAL_URL")
            .ok_or_else(|| config_error("Environment variable FEED_URL is required"))?;
        let feed_url = parse_http_url("FEED_URL", &feed_url)?;

        let webhook_url = get_either("WEBHOOK_URL", "MATTERMOST_WEBHOOK_URL")
            .ok_or_else(|| config_error("Environment variable WEBHOOK_URL is required"))?;
        let webhook_url = parse_http_url("WEBHOOK_URL", &webhook_url)?;

        let window_minutes = get_either("WINDOW_MINUTES", "NOTICE_WINDOW_MINUTES")
            .ok_or_else(|| config_error("Environment variable WINDOW_MINUTES is required"))?;
        let window_minutes = parse_positive::<u32>(&window_minutes)
            .ok_or_else(|| config_error("WINDOW_MINUTES must be a positive integer"))?;

        let timezone = match get("TIMEZONE") {
            Some(name) => resolve_timezone(&name)
                .ok_or_else(|| config_error(&format!("Invalid TIMEZONE value: {}", name)))?,
            None => Tz::UTC,
        };

        let max_events = get("MAX_EVENTS").and_then(|raw| {
            let parsed = parse_positive::<usize>(&raw);
            if parsed.is_none() {
                warn!("Ignoring MAX_EVENTS because it is not a positive integer: {}", raw);
            }
            parsed
        });

        let state_file = get("STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        let locale = match get("LOCALE") {
            Some(locale) if SUPPORTED_LOCALES.contains(&locale.as_str()) => locale,
            Some(locale) => {
                warn!("Unsupported LOCALE {}, falling back to {}", locale, DEFAULT_LOCALE);
                DEFAULT_LOCALE.to_string()
            }
            None => DEFAULT_LOCALE.to_string(),
        };

        let retention_days = match get("STATE_RETENTION_DAYS") {
            Some(raw) => parse_positive::<u32>(&raw).unwrap_or_else(|| {
                warn!(
                    "Ignoring STATE_RETENTION_DAYS because it is not a positive integer: {}",
                    raw
                );
                DEFAULT_RETENTION_DAYS
            }),
            None => DEFAULT_RETENTION_DAYS,
        };

        Ok(Config {
            feed_url,
            webhook_url,
            window_minutes,
            timezone,
            max_events,
            state_file,
            locale,
            retention_days,
        })
    }
}

fn parse_http_url(name: &str, raw: &str) -> NotifierResult<Url> {
    let url = Url::parse(raw).map_err(|e| config_error(&format!("Invalid {}: {}", name, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(config_error(&format!(
            "{} must be an http(s) URL, got scheme '{}'",
            name, scheme
        ))),
    }
}

/// Parse a strictly positive integer
fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.parse::<T>().ok().filter(|value| *value > T::default())
}
