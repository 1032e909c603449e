//! Player, standing and match payload types exchanged with the Riot API.

use serde::{Deserialize, Serialize};

/// Durable player key (PUUID) obtained by resolving an account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerKey(pub String);

impl PlayerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A player's current ranked standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// CHALLENGER, ..., IRON.
    pub tier: String,
    /// Sub-tier within the tier, I to IV.
    pub rank: String,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,
}

impl Standing {
    /// Check if this standing is worth recording over `latest`.
    ///
    /// Only a change of tier or league points counts; rank and win/loss
    /// changes alone are not recorded.
    pub fn differs_from(&self, latest: Option<&Standing>) -> bool {
        match latest {
            None => true,
            Some(prev) => prev.tier != self.tier || prev.league_points != self.league_points,
        }
    }
}

/// Full match detail as returned by the API, kept opaque apart from its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPayload {
    pub match_id: String,
    pub body: serde_json::Value,
}

impl MatchPayload {
    /// Build a payload from a raw match document, reading the id from
    /// `metadata.match_id`.
    pub fn from_body(body: serde_json::Value) -> Option<Self> {
        let match_id = body
            .get("metadata")
            .and_then(|m| m.get("match_id"))
            .and_then(|id| id.as_str())?
            .to_string();
        Some(Self { match_id, body })
    }
}
