//! Core domain types for the match crawler.
//!
//! This crate contains shared types used across all packages:
//! - FetchItem, FetchKind and FetchStatus for queue work items
//! - PlayerKey, Standing and MatchPayload for API data
//! - The RiotApi client contract and its error type
//! - Events for observers

mod api;
mod events;
mod item;
mod player;

pub use api::{ApiError, RiotApi};
pub use events::FetchEvent;
pub use item::{FetchItem, FetchKind, FetchStatus, ItemId};
pub use player::{MatchPayload, PlayerKey, Standing};
