use crate::errors::ConfigError;
use crate::models::Credentials;
use std::{env, time::Duration};
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_ms = match lookup("BOOKING_API_TIMEOUT_MS") {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "BOOKING_API_TIMEOUT_MS",
                expected: "a number of milliseconds",
                value,
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let raw_url = lookup("BOOKING_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let base_url = normalize_base_url(&raw_url)?;

        let credentials = match (lookup("BOOKING_API_USERNAME"), lookup("BOOKING_API_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Ok(Self {
            port,
            backend: BackendConfig {
                base_url,
                timeout: Duration::from_millis(timeout_ms),
            },
            credentials,
        })
    }
}

/// Endpoint paths are joined relative to the base, so it must end in `/`.
fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}
