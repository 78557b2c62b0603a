use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::info;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NOTIFICATION_MS: u64 = 3000;

/// Client settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    /// Forwarded as the `Cookie` header; the voting endpoints require a login.
    pub session_cookie: Option<String>,
    pub notification_lifetime: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_cookie: None,
            notification_lifetime: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CLASSIFY_BASE_URL")
            .unwrap_or_else(|| {
                info!("CLASSIFY_BASE_URL not set, using default: {}", DEFAULT_BASE_URL);
                DEFAULT_BASE_URL.to_string()
            })
            .trim_end_matches('/')
            .to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "CLASSIFY_BASE_URL",
                value: base_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let timeout_secs: u64 = try_load(&lookup, "CLASSIFY_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let notification_ms: u64 =
            try_load(&lookup, "CLASSIFY_NOTIFICATION_MS", DEFAULT_NOTIFICATION_MS)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            session_cookie: lookup("CLASSIFY_SESSION_COOKIE").filter(|c| !c.trim().is_empty()),
            notification_lifetime: Duration::from_millis(notification_ms),
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
