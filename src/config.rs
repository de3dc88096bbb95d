//! Process-wide configuration, loaded once at startup
//!
//! Values come from the environment (populated from `.env` by `dotenvy`
//! before [`AppConfig::from_env`] is called).

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Immutable allow-list of API keys
#[derive(Debug, Clone)]
pub struct ApiKeys(Arc<HashSet<String>>);

impl ApiKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(keys.into_iter().map(Into::into).collect()))
    }

    /// Parses a comma-separated list, trimming entries and dropping empty ones.
    pub fn parse(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty()),
        )
    }

    /// Exact string membership
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_keys: ApiKeys,

    /// Host to bind the HTTP listener to
    pub host: String,

    pub port: u16,

    /// Base used when generating short links, e.g. "https://go.example.com".
    /// Stored without a trailing slash.
    pub public_url: String,

    /// Path of the redb database file
    pub database_url: String,

    /// Fixed sweep interval. `None` sweeps once a day at local midnight.
    pub sweep_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_keys = lookup("API_KEYS")
            .context("API_KEYS must be set in the environment or .env file")?;
        let api_keys = ApiKeys::parse(&raw_keys);
        if api_keys.is_empty() {
            bail!("API_KEYS must contain at least one non-empty key");
        }

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let public_url = lookup("PUBLIC_URL")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_owned();

        let sweep_interval = match lookup("SWEEP_INTERVAL_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .context("SWEEP_INTERVAL_SECS must be a positive integer")?;
                if secs == 0 {
                    bail!("SWEEP_INTERVAL_SECS must be greater than zero");
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_keys,
            host: lookup("HOST").unwrap_or_else(|| "localhost".into()),
            port,
            public_url,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "data.db".into()),
            sweep_interval,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::from_lookup(lookup(&[("API_KEYS", "abc")])).unwrap();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_url, "http://localhost:3000");
        assert_eq!(config.database_url, "data.db");
        assert_eq!(config.sweep_interval, None);
        assert_eq!(config.bind_addr(), "localhost:3000");
    }

    #[test]
    fn missing_api_keys_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("API_KEYS"));
    }

    #[test]
    fn blank_api_keys_is_an_error() {
        assert!(AppConfig::from_lookup(lookup(&[("API_KEYS", " , ,")])).is_err());
    }

    #[test]
    fn api_keys_are_trimmed() {
        let keys = ApiKeys::parse("one, two ,,three");

        assert_eq!(keys.len(), 3);
        assert!(keys.contains("two"));
        assert!(!keys.contains(" two "));
        assert!(!keys.contains(""));
    }

    #[test]
    fn overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("API_KEYS", "abc"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("PUBLIC_URL", "https://sho.rt/"),
            ("DATABASE_URL", "/tmp/links.db"),
            ("SWEEP_INTERVAL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.public_url, "https://sho.rt");
        assert_eq!(config.database_url, "/tmp/links.db");
        assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
    }

    #[test]
    fn invalid_port() {
        let err =
            AppConfig::from_lookup(lookup(&[("API_KEYS", "abc"), ("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn zero_sweep_interval() {
        assert!(AppConfig::from_lookup(lookup(&[
            ("API_KEYS", "abc"),
            ("SWEEP_INTERVAL_SECS", "0"),
        ]))
        .is_err());
    }
}
