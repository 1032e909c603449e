//! Riot TFT API access for the crawler.
//!
//! - `RiotClient` - reqwest-backed implementation of `queue_core::RiotApi`
//! - `CachedRiotApi` - wraps any `RiotApi` and caches account resolution
//! - `TtlCache` - bounded, thread-safe cache with per-entry expiry

mod cache;
mod cached;
mod client;
mod config;

pub use cache::TtlCache;
pub use cached::CachedRiotApi;
pub use client::RiotClient;
pub use config::RiotConfig;
