//! Shared collaborators handed to every handler and service.

use std::sync::Arc;

use db::Database;
use db::repositories::{FetchQueueRepository, MatchRepository, StandingRepository};
use queue_core::{FetchEvent, RiotApi};
use tokio::sync::broadcast;

use crate::CrawlerConfig;
use crate::gate::{CrawlGate, GatedApi};
use crate::sinks::{MatchSink, StandingSink};

#[derive(Clone)]
pub struct CrawlerContext {
    /// The Riot API behind the crawl gate.
    pub api: Arc<dyn RiotApi>,
    pub queue: FetchQueueRepository,
    pub matches: Arc<dyn MatchSink>,
    pub standings: Arc<dyn StandingSink>,
    pub config: Arc<CrawlerConfig>,
    /// Shared rate-limit pause.
    pub gate: CrawlGate,
    events: Option<broadcast::Sender<FetchEvent>>,
}

impl CrawlerContext {
    /// Wire the database-backed queue and sinks around `api`.
    ///
    /// Calls through `api` hold off while `gate` is paused.
    pub fn new(api: Arc<dyn RiotApi>, db: Database, config: CrawlerConfig) -> Self {
        let gate = CrawlGate::new();
        Self {
            api: Arc::new(GatedApi::new(api, gate.clone())),
            queue: FetchQueueRepository::new(db.clone()),
            matches: Arc::new(MatchRepository::new(db.clone())),
            standings: Arc::new(StandingRepository::new(db)),
            config: Arc::new(config),
            gate,
            events: None,
        }
    }

    /// Broadcast fetch events on `tx`.
    pub fn with_events(mut self, tx: broadcast::Sender<FetchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<FetchEvent>> {
        self.events.as_ref().map(|tx| tx.subscribe())
    }

    pub(crate) fn emit(&self, event: FetchEvent) {
        if let Some(tx) = &self.events {
            // No subscribers is fine.
            let _ = tx.send(event);
        }
    }
}
