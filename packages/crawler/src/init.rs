//! Crawler startup.

use std::sync::Arc;

use actors::{
    ActorRef, CrawlerConfig, CrawlerContext, SupervisorArgs, SupervisorMessage, seed_accounts, start_supervisor,
};
use db::DbConfig;
use riot::{CachedRiotApi, RiotClient, RiotConfig};
use tokio::sync::broadcast;

/// Connect everything and start the schedulers.
pub async fn init_crawler() -> Result<(ActorRef<SupervisorMessage>, tokio::task::JoinHandle<()>), Box<dyn std::error::Error>> {
    tracing::info!("Initializing match crawler...");

    let config = CrawlerConfig::from_env();
    let riot_config = RiotConfig::from_env();
    if riot_config.api_key.is_empty() {
        tracing::warn!("RIOT_API_KEY is not set; every API call will be rejected");
    }

    let db = db::init(DbConfig::from_env()).await?;

    let api = CachedRiotApi::new(
        RiotClient::new(riot_config)?,
        config.account_cache_ttl,
        config.account_cache_capacity,
    );

    let (events, _) = broadcast::channel(256);
    let ctx = CrawlerContext::new(Arc::new(api), db.clone(), config).with_events(events);

    seed_accounts(&ctx.queue, &ctx.config.seed_accounts, ctx.config.seed_priority).await?;

    let counts = ctx.queue.count_by_status().await?;
    tracing::info!("Queue status at startup: {:?}", counts);

    if let Some(mut rx) = ctx.subscribe() {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => tracing::debug!("{}", event.description()),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::debug!("Event log skipped {} events", missed)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    let supervisor = start_supervisor(SupervisorArgs::crawler(&ctx)).await?;

    tracing::info!("Match crawler initialized");
    Ok(supervisor)
}
