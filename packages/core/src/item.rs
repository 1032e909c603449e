//! Fetch queue work items.

use std::sync::{LazyLock, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

/// Process-wide generator so ids minted in the same millisecond still sort
/// in creation order.
static ID_GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Unique identifier for a queue item, using a monotonic ULID so that
/// lexicographic order is enqueue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Ulid);

impl ItemId {
    /// Create a new item ID, strictly greater than any previously created one
    /// in this process.
    pub fn new() -> Self {
        let mut generator = ID_GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
        // Overflow needs 2^80 ids within one millisecond.
        Self(generator.generate().unwrap_or_else(|_| Ulid::new()))
    }

    /// Parse an item ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an item's `external_id` refers to, and therefore which handler runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchKind {
    /// A human-facing account id that still has to be resolved to a player key.
    IdentityId,
    /// A durable player key whose match history gets listed.
    Identity,
    /// A match id whose detail gets fetched and saved.
    Match,
}

impl FetchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::IdentityId => "IDENTITY_ID",
            FetchKind::Identity => "IDENTITY",
            FetchKind::Match => "MATCH",
        }
    }
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a queue item.
///
/// ```text
/// READY --claim--> FETCHING --success--> DONE
/// FETCHING --rate-limited--> READY
/// FETCHING --other failure--> FAIL
/// FAIL --rediscovered--> READY
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    /// Waiting to be claimed.
    #[default]
    Ready,
    /// Claimed by the orchestrator.
    Fetching,
    /// Processed successfully. Terminal.
    Done,
    /// Processing failed; revived by a later listing pass.
    Fail,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Ready => "READY",
            FetchStatus::Fetching => "FETCHING",
            FetchStatus::Done => "DONE",
            FetchStatus::Fail => "FAIL",
        }
    }

    /// Check if no transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchStatus::Done)
    }

    /// Statuses an item may be in for a transition into `self` to be legal.
    pub fn allowed_sources(&self) -> &'static [FetchStatus] {
        match self {
            FetchStatus::Ready => &[FetchStatus::Fetching, FetchStatus::Fail],
            FetchStatus::Fetching => &[FetchStatus::Ready],
            FetchStatus::Done => &[FetchStatus::Fetching],
            FetchStatus::Fail => &[FetchStatus::Fetching],
        }
    }

    /// Check if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: FetchStatus) -> bool {
        next.allowed_sources().contains(self)
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work in the fetch queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchItem {
    /// Unique identifier, also the FIFO tie-breaker.
    pub id: ItemId,
    /// Account id, player key or match id, depending on `kind`.
    pub external_id: String,
    /// Which handler processes this item.
    pub kind: FetchKind,
    /// Current status.
    pub status: FetchStatus,
    /// Higher claims first.
    pub priority: i32,
    /// Refreshed on every status transition.
    pub updated_at: DateTime<Utc>,
}

impl FetchItem {
    /// Create a new ready item.
    pub fn new(external_id: impl Into<String>, kind: FetchKind, priority: i32) -> Self {
        Self {
            id: ItemId::new(),
            external_id: external_id.into(),
            kind,
            status: FetchStatus::Ready,
            priority,
            updated_at: Utc::now(),
        }
    }

    /// Create an item discovered while processing `self`, one priority step
    /// below its parent.
    pub fn child(&self, external_id: impl Into<String>, kind: FetchKind) -> Self {
        Self::new(external_id, kind, self.child_priority())
    }

    /// Priority given to items discovered from this one.
    pub fn child_priority(&self) -> i32 {
        self.priority.saturating_sub(1)
    }

    /// Set the status for this item.
    pub fn with_status(mut self, status: FetchStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the last-updated timestamp for this item.
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}
