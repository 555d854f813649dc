//! Configuration management for the BusWay client.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary loads `.env` into the environment first.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default API root
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Longest accepted request timeout (one day)
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 86_400;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Booking API root (`BUSWAY_API_URL`)
    pub api_url: String,
    /// Per-request timeout in seconds (`BUSWAY_HTTP_TIMEOUT_SECS`)
    pub http_timeout_secs: u64,
    /// Where the session is stored (`BUSWAY_SESSION_FILE`)
    pub session_file: PathBuf,
    /// Default log filter when `RUST_LOG` is unset (`BUSWAY_LOG`)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup("BUSWAY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            http_timeout_secs: lookup("BUSWAY_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|&secs| secs > 0)
                .map(|secs: u64| secs.min(MAX_HTTP_TIMEOUT_SECS))
                .unwrap_or(30),
            session_file: lookup("BUSWAY_SESSION_FILE")
                .map_or_else(default_session_file, PathBuf::from),
            log_filter: lookup("BUSWAY_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Request timeout
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// `<home>/.busway/session.json`, or `./.busway/session.json` without a home
fn default_session_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".busway")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]);

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(config.session_file.ends_with(".busway/session.json"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("BUSWAY_API_URL", "https://api.busway.example"),
            ("BUSWAY_HTTP_TIMEOUT_SECS", "5"),
            ("BUSWAY_SESSION_FILE", "/tmp/busway.json"),
            ("BUSWAY_LOG", "busway=debug"),
        ]);

        assert_eq!(config.api_url, "https://api.busway.example");
        assert_eq!(config.http_timeout_secs, 5);
        assert_eq!(config.session_file, PathBuf::from("/tmp/busway.json"));
        assert_eq!(config.log_filter, "busway=debug");
    }

    #[test]
    fn unusable_timeout_falls_back() {
        assert_eq!(config(&[("BUSWAY_HTTP_TIMEOUT_SECS", "soon")]).http_timeout_secs, 30);
        assert_eq!(config(&[("BUSWAY_HTTP_TIMEOUT_SECS", "0")]).http_timeout_secs, 30);
    }

    #[test]
    fn huge_timeout_is_capped() {
        let config = config(&[("BUSWAY_HTTP_TIMEOUT_SECS", "18446744073709551615")]);

        assert_eq!(config.http_timeout_secs, MAX_HTTP_TIMEOUT_SECS);
        assert!(config.http_timeout().checked_add(Duration::from_secs(5)).is_some());
    }
}
