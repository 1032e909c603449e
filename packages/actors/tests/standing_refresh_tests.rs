#![allow(clippy::disallowed_methods)]

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use actors::{CrawlerConfig, RefreshReport, StandingRefresher};
use common::{FakeRiot, setup_ctx, standing};
use db::repositories::StandingRepository;
use queue_core::{ApiError, PlayerKey};

#[tokio::test]
async fn refresh_records_only_changes() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(
        FakeRiot::new()
            .with_standing("puuid-1", standing("GOLD", 60))
            .with_standing("puuid-2", standing("SILVER", 10)),
    );
    let (ctx, db) = setup_ctx(api.clone(), CrawlerConfig::default()).await?;
    let standings = StandingRepository::new(db);

    for (player, tier, lp) in [("puuid-1", "GOLD", 40), ("puuid-2", "SILVER", 10), ("puuid-3", "IRON", 0)] {
        standings.record(&PlayerKey::new(player), &standing(tier, lp)).await?;
    }

    let report = StandingRefresher::new(&ctx).refresh().await?;
    assert_eq!(
        report,
        RefreshReport {
            active: 3,
            recorded: 1,
            unchanged: 1,
            unranked: 1,
            failed: 0,
            rate_limited: false,
        }
    );

    let latest = standings.latest(&PlayerKey::new("puuid-1")).await?.expect("recorded");
    assert_eq!(latest.league_points, 60);
    assert_eq!(standings.history(&PlayerKey::new("puuid-2")).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn refresh_skips_failing_players() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(
        FakeRiot::new()
            .with_standing("puuid-2", standing("GOLD", 1))
            .fail("standing:puuid-1", ApiError::Transport("reset".into())),
    );
    let (ctx, db) = setup_ctx(api.clone(), CrawlerConfig::default()).await?;
    let standings = StandingRepository::new(db);
    standings.record(&PlayerKey::new("puuid-1"), &standing("GOLD", 0)).await?;
    standings.record(&PlayerKey::new("puuid-2"), &standing("GOLD", 0)).await?;

    let report = StandingRefresher::new(&ctx).refresh().await?;
    assert_eq!((report.failed, report.recorded), (1, 1));
    assert!(!report.rate_limited);

    Ok(())
}

#[tokio::test]
async fn rate_limit_ends_the_pass() -> Result<(), Box<dyn Error>> {
    let limited = ApiError::RateLimited { retry_after_secs: Some(3) };
    let api = Arc::new(
        FakeRiot::new()
            .fail("standing:puuid-1", limited.clone())
            .fail("standing:puuid-2", limited),
    );
    let (ctx, db) = setup_ctx(api.clone(), CrawlerConfig::default()).await?;
    let standings = StandingRepository::new(db);
    standings.record(&PlayerKey::new("puuid-1"), &standing("GOLD", 0)).await?;
    standings.record(&PlayerKey::new("puuid-2"), &standing("GOLD", 0)).await?;

    let started = tokio::time::Instant::now();
    let report = StandingRefresher::new(&ctx).refresh().await?;
    assert!(report.rate_limited);
    assert_eq!(api.calls_starting_with("standing:").len(), 1);

    // The rest of the crawl holds off for Retry-After plus the pad.
    let resume = ctx.gate.paused_until().expect("crawl paused");
    assert!(resume >= started + Duration::from_secs(4));
    assert!(resume <= tokio::time::Instant::now() + Duration::from_secs(4));

    Ok(())
}

#[tokio::test]
async fn inactive_players_are_not_refreshed() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(FakeRiot::new());
    let mut config = CrawlerConfig::default();
    config.standing_active_window = chrono::Duration::zero();
    let (ctx, db) = setup_ctx(api.clone(), config).await?;
    StandingRepository::new(db)
        .record(&PlayerKey::new("puuid-1"), &standing("GOLD", 0))
        .await?;

    tokio::time::sleep(Duration::from_millis(20)).await;
    let report = StandingRefresher::new(&ctx).refresh().await?;
    assert_eq!(report.active, 0);
    assert!(api.calls().is_empty());

    Ok(())
}
