//! Riot API client configuration.

use std::time::Duration;

/// Riot API client configuration.
#[derive(Debug, Clone)]
pub struct RiotConfig {
    /// Developer or production key, sent as `X-Riot-Token`.
    pub api_key: String,
    /// Platform routing host (summoner and league endpoints).
    pub platform_base_url: String,
    /// Regional routing host (match endpoints).
    pub regional_base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            platform_base_url: "https://kr.api.riotgames.com".to_string(),
            regional_base_url: "https://asia.api.riotgames.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RiotConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Build a config from `RIOT_*` environment variables.
    ///
    /// `RIOT_API_KEY` is read as is; an unset key leaves it empty.
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("RIOT_API_KEY").unwrap_or_default());
        if let Ok(url) = std::env::var("RIOT_PLATFORM_URL") {
            config = config.with_platform_base_url(url);
        }
        if let Ok(url) = std::env::var("RIOT_REGIONAL_URL") {
            config = config.with_regional_base_url(url);
        }
        if let Some(secs) = std::env::var("RIOT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn with_platform_base_url(mut self, url: impl Into<String>) -> Self {
        self.platform_base_url = url.into();
        self
    }

    pub fn with_regional_base_url(mut self, url: impl Into<String>) -> Self {
        self.regional_base_url = url.into();
        self
    }

    /// Point both routing hosts at one base URL.
    pub fn with_base_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.with_platform_base_url(url.clone())
            .with_regional_base_url(url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
