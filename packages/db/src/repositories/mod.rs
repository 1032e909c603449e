//! Repository implementations for database operations.

mod fetch_queue_repo;
mod match_repo;
mod standing_repo;

pub use fetch_queue_repo::FetchQueueRepository;
pub use match_repo::MatchRepository;
pub use standing_repo::StandingRepository;
