//! Fetch queue orchestration for the match crawler.
//!
//! # Architecture
//!
//! - `FetchService` - claims one item per tick and works the in-flight set
//! - `HandlerSet` - one `FetchHandler` per item kind
//! - `StatusUpdater` / `BackoffController` - status writes and rate-limit stalls
//! - `CrawlGate` - pauses every API caller while a stall is in effect
//! - `StandingRefresher` - re-checks standings of recently active players
//! - `TickActor` - runs a `PeriodicTask` with fixed delay
//! - `Supervisor` - owns the tick actors and restarts failed ones
//!
//! # Usage
//!
//! ```ignore
//! use actors::{CrawlerContext, SupervisorArgs, start_supervisor};
//!
//! let ctx = CrawlerContext::new(api, db, CrawlerConfig::from_env());
//! let (supervisor, handle) = start_supervisor(SupervisorArgs::crawler(&ctx)).await?;
//! ```

mod backoff;
mod config;
mod context;
mod error;
mod fetch_service;
mod gate;
mod handler;
pub mod handlers;
mod messages;
mod seed;
mod sinks;
mod standing_refresh;
mod status;
mod supervisor;
mod task;
mod tick_actor;

pub use backoff::BackoffController;
pub use config::CrawlerConfig;
pub use context::CrawlerContext;
pub use error::FetchError;
pub use fetch_service::{FetchService, TickReport};
pub use gate::CrawlGate;
pub use handler::{FetchHandler, HandlerFuture, HandlerResult, HandlerSet};
pub use messages::{SupervisorMessage, TickMessage, TickStats};
pub use seed::seed_accounts;
pub use sinks::{MatchSink, StandingSink};
pub use standing_refresh::{RefreshReport, StandingRefresher};
pub use status::StatusUpdater;
pub use supervisor::{ScheduledTask, Supervisor, SupervisorArgs, start_supervisor};
pub use task::PeriodicTask;
pub use tick_actor::{TickActor, TickArgs};

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
