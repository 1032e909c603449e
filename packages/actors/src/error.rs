//! Errors raised while processing queue items.

use db::DbError;
use queue_core::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl FetchError {
    /// Get the retry delay if the API rate-limited the call.
    ///
    /// `Some(None)` is a rate limit without a Retry-After hint; `None` means
    /// an ordinary failure.
    pub fn retry_after(&self) -> Option<Option<u64>> {
        match self {
            FetchError::Api(e) => e.retry_after(),
            FetchError::Db(_) => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.retry_after().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_carry_retry_after() {
        let limited = FetchError::from(ApiError::RateLimited {
            retry_after_secs: Some(7),
        });
        assert_eq!(limited.retry_after(), Some(Some(7)));

        let unhinted = FetchError::from(ApiError::RateLimited {
            retry_after_secs: None,
        });
        assert!(unhinted.is_rate_limited());

        assert!(!FetchError::from(ApiError::Transport("reset".into())).is_rate_limited());
        assert!(!FetchError::from(DbError::Query("boom".into())).is_rate_limited());
    }
}
