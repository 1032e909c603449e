//! Crawler scheduling and discovery settings.

use std::str::FromStr;
use std::time::Duration;

/// Crawler configuration.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Delay between the end of one fetch tick and the start of the next.
    pub tick_interval: Duration,
    /// Delay between standing refresh passes.
    pub standing_refresh_interval: Duration,
    /// Only matches played at or after this unix timestamp are listed.
    pub season_start_epoch: i64,
    /// Match ids requested per listing page.
    pub page_size: u32,
    /// Stall used when a rate-limit answer carries no Retry-After.
    pub default_retry_after_secs: u64,
    /// Added on top of every rate-limit stall.
    pub backoff_pad_secs: u64,
    /// Account ids enqueued at startup.
    pub seed_accounts: Vec<String>,
    pub seed_priority: i32,
    /// Players with a standing recorded within this window are refreshed.
    pub standing_active_window: chrono::Duration,
    pub account_cache_ttl: Duration,
    pub account_cache_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(2),
            standing_refresh_interval: Duration::from_secs(60),
            season_start_epoch: 1_764_687_600,
            page_size: 100,
            default_retry_after_secs: 10,
            backoff_pad_secs: 1,
            seed_accounts: Vec::new(),
            seed_priority: 10,
            standing_active_window: chrono::Duration::hours(24),
            account_cache_ttl: Duration::from_secs(600),
            account_cache_capacity: 10_000,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={}", name, value);
            None
        }
    }
}

impl CrawlerConfig {
    /// Build a config from `CRAWLER_*` environment variables over the defaults.
    ///
    /// `CRAWLER_SEED_ACCOUNTS` is a comma-separated list of account ids.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_parse::<u64>("CRAWLER_TICK_MS") {
            config = config.with_tick_interval(Duration::from_millis(ms));
        }
        if let Some(secs) = env_parse::<u64>("CRAWLER_STANDING_REFRESH_SECS") {
            config.standing_refresh_interval = Duration::from_secs(secs);
        }
        if let Some(epoch) = env_parse("CRAWLER_SEASON_START") {
            config = config.with_season_start_epoch(epoch);
        }
        if let Some(size) = env_parse("CRAWLER_PAGE_SIZE") {
            config = config.with_page_size(size);
        }
        if let Some(secs) = env_parse("CRAWLER_DEFAULT_RETRY_AFTER_SECS") {
            config.default_retry_after_secs = secs;
        }
        if let Ok(accounts) = std::env::var("CRAWLER_SEED_ACCOUNTS") {
            config = config.with_seed_accounts(accounts.split(','));
        }
        if let Some(priority) = env_parse("CRAWLER_SEED_PRIORITY") {
            config = config.with_seed_priority(priority);
        }
        if let Some(hours) = env_parse("CRAWLER_STANDING_WINDOW_HOURS") {
            config.standing_active_window = chrono::Duration::hours(hours);
        }
        config
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_season_start_epoch(mut self, epoch: i64) -> Self {
        self.season_start_epoch = epoch;
        self
    }

    /// Set the seed accounts, dropping blanks.
    pub fn with_seed_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.seed_accounts = accounts
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    pub fn with_seed_priority(mut self, priority: i32) -> Self {
        self.seed_priority = priority;
        self
    }
}
