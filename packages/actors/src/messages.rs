//! Message types for actor communication.

use ractor::RpcReplyPort;
use serde::{Deserialize, Serialize};

/// Messages for a `TickActor`.
#[derive(Debug)]
pub enum TickMessage {
    /// Run the task once, then schedule the next tick.
    Tick,

    /// Get run counters.
    GetStats { reply: RpcReplyPort<TickStats> },

    /// Stop scheduling; the actor exits.
    Shutdown,
}

/// Run counters of a `TickActor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    pub task: String,
    pub runs: u64,
    pub failures: u64,
}

/// Messages for the `Supervisor`.
#[derive(Debug)]
pub enum SupervisorMessage {
    /// Collect stats from every scheduled task.
    GetStatus { reply: RpcReplyPort<Vec<TickStats>> },

    /// Stop every scheduled task and then the supervisor.
    Shutdown,
}
