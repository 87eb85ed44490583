use serde::Deserialize;

use crate::services::{aggregator::DEFAULT_PAGE_CAP, suggestions::DEFAULT_SUGGESTION_LIMIT};

/// Backend used for the session-scoped handoff store and the response cache
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key. Optional at boot; every upstream call fails without it.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Where session handoffs and cached upstream responses live
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Default number of upstream pages a "view all" aggregation may fetch
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,

    /// Default number of type-ahead suggestions kept per session
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Lifetime of handoff entries and idle search sessions, in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_page_cap() -> u32 {
    DEFAULT_PAGE_CAP
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit list of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.page_cap == 0 {
            anyhow::bail!("PAGE_CAP must be at least 1");
        }
        if self.suggestion_limit == 0 {
            anyhow::bail!("SUGGESTION_LIMIT must be at least 1");
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be at least 1");
        }
        Ok(())
    }

    /// The configured credential, treating a blank value as absent
    pub fn api_key(&self) -> Option<String> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_credential() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.api_key(), None);
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.page_cap, 20);
        assert_eq!(config.suggestion_limit, 8);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(vars(&[
            ("TMDB_API_KEY", "abc123"),
            ("STORE_BACKEND", "memory"),
            ("PAGE_CAP", "5"),
            ("SUGGESTION_LIMIT", "16"),
        ]))
        .unwrap();
        assert_eq!(config.api_key(), Some("abc123".to_string()));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.page_cap, 5);
        assert_eq!(config.suggestion_limit, 16);
    }

    #[test]
    fn test_blank_credential_is_absent() {
        let config = Config::from_vars(vars(&[("TMDB_API_KEY", "   ")])).unwrap();
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn test_zero_page_cap_rejected() {
        assert!(Config::from_vars(vars(&[("PAGE_CAP", "0")])).is_err());
    }
}
