//! Fixed-delay scheduler actor for one periodic task.

use std::sync::Arc;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::messages::{TickMessage, TickStats};
use crate::task::PeriodicTask;

/// State for the tick actor.
pub struct TickActorState {
    task: Arc<dyn PeriodicTask>,
    interval: Duration,
    stats: TickStats,
    running: bool,
}

/// Tick actor arguments.
pub struct TickArgs {
    pub task: Arc<dyn PeriodicTask>,
    pub interval: Duration,
}

/// Runs its task, waits `interval`, runs it again.
///
/// The next tick is only scheduled once the current run has returned, so
/// runs never overlap and a long stall inside the task pushes the schedule
/// back instead of piling up ticks.
pub struct TickActor;

impl Actor for TickActor {
    type Msg = TickMessage;
    type State = TickActorState;
    type Arguments = TickArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting {} scheduler (every {:?})",
            args.task.name(),
            args.interval
        );

        Ok(TickActorState {
            stats: TickStats {
                task: args.task.name().to_string(),
                ..Default::default()
            },
            task: args.task,
            interval: args.interval,
            running: true,
        })
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        _state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        myself.send_message(TickMessage::Tick)?;
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            TickMessage::Tick => {
                if !state.running {
                    return Ok(());
                }

                state.stats.runs += 1;
                if let Err(e) = state.task.run().await {
                    state.stats.failures += 1;
                    tracing::error!("{} run failed: {}", state.stats.task, e);
                }

                myself.send_after(state.interval, || TickMessage::Tick);
            }

            TickMessage::GetStats { reply } => {
                let _ = reply.send(state.stats.clone());
            }

            TickMessage::Shutdown => {
                tracing::info!("Stopping {} scheduler", state.stats.task);
                state.running = false;
                myself.stop(None);
            }
        }

        Ok(())
    }
}
