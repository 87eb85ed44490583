use std::sync::Arc;

use crate::{
    config::Config,
    db::KeyValueStore,
    services::{providers::CatalogProvider, SessionRegistry},
};

/// Tunables for search endpoints, taken from [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub page_cap: u32,
    pub suggestion_limit: usize,
    pub session_ttl_secs: u64,
}

impl From<&Config> for SearchSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_cap: config.page_cap,
            suggestion_limit: config.suggestion_limit,
            session_ttl_secs: config.session_ttl_secs,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub provider: Arc<dyn CatalogProvider>,
    pub sessions: SessionRegistry,
    pub settings: SearchSettings,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        store: Arc<dyn KeyValueStore>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(provider.clone(), store, settings.session_ttl_secs),
            provider,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_follow_config_defaults() {
        let config = Config::from_vars(std::iter::empty()).unwrap();
        let settings = SearchSettings::from(&config);
        assert_eq!(settings.page_cap, 20);
        assert_eq!(settings.suggestion_limit, 8);
        assert_eq!(settings.session_ttl_secs, 1800);
    }
}
