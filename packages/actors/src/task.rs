//! Work run on a fixed-delay schedule.

use futures_util::future::BoxFuture;

use crate::error::FetchError;
use crate::fetch_service::FetchService;
use crate::standing_refresh::StandingRefresher;

/// A unit of recurring work driven by a `TickActor`.
pub trait PeriodicTask: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn run(&self) -> BoxFuture<'_, Result<(), FetchError>>;
}

impl PeriodicTask for FetchService {
    fn name(&self) -> &str {
        "fetch"
    }

    fn run(&self) -> BoxFuture<'_, Result<(), FetchError>> {
        Box::pin(async move {
            let report = self.fetch_next().await?;
            if report.claimed {
                tracing::debug!(
                    "Tick: {} processed ({} done, {} failed, {} requeued)",
                    report.processed(),
                    report.completed,
                    report.failed,
                    report.requeued
                );
            }
            Ok(())
        })
    }
}

impl PeriodicTask for StandingRefresher {
    fn name(&self) -> &str {
        "standing-refresh"
    }

    fn run(&self) -> BoxFuture<'_, Result<(), FetchError>> {
        Box::pin(async move {
            self.refresh().await?;
            Ok(())
        })
    }
}
