//! Supervisor actor owning the crawler's schedulers.

use std::sync::Arc;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef, SupervisionEvent};

use crate::fetch_service::FetchService;
use crate::messages::{SupervisorMessage, TickMessage};
use crate::standing_refresh::StandingRefresher;
use crate::task::PeriodicTask;
use crate::tick_actor::{TickActor, TickArgs};
use crate::CrawlerContext;

const STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// A task and how often it runs.
#[derive(Clone)]
pub struct ScheduledTask {
    pub task: Arc<dyn PeriodicTask>,
    pub interval: Duration,
}

/// Supervisor arguments.
#[derive(Clone, Default)]
pub struct SupervisorArgs {
    pub tasks: Vec<ScheduledTask>,
}

impl SupervisorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Arc<dyn PeriodicTask>, interval: Duration) -> Self {
        self.tasks.push(ScheduledTask { task, interval });
        self
    }

    /// The match fetch loop and the standing refresh, at configured intervals.
    pub fn crawler(ctx: &CrawlerContext) -> Self {
        Self::new()
            .with_task(Arc::new(FetchService::new(ctx.clone())), ctx.config.tick_interval)
            .with_task(
                Arc::new(StandingRefresher::new(ctx)),
                ctx.config.standing_refresh_interval,
            )
    }
}

struct Child {
    scheduled: ScheduledTask,
    actor: ActorRef<TickMessage>,
}

/// State for the supervisor actor.
pub struct SupervisorState {
    children: Vec<Child>,
    shutting_down: bool,
}

async fn spawn_child(
    myself: &ActorRef<SupervisorMessage>,
    scheduled: ScheduledTask,
) -> Result<Child, ActorProcessingErr> {
    let args = TickArgs {
        task: scheduled.task.clone(),
        interval: scheduled.interval,
    };
    let (actor, _handle) = Actor::spawn_linked(None, TickActor, args, myself.get_cell())
        .await
        .map_err(|e| {
            ActorProcessingErr::from(format!(
                "Failed to spawn {} scheduler: {}",
                scheduled.task.name(),
                e
            ))
        })?;
    Ok(Child { scheduled, actor })
}

/// Supervisor actor that starts one `TickActor` per task and restarts any
/// that fail.
pub struct Supervisor;

impl Actor for Supervisor {
    type Msg = SupervisorMessage;
    type State = SupervisorState;
    type Arguments = SupervisorArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting crawler supervisor");

        let mut children = Vec::with_capacity(args.tasks.len());
        for scheduled in args.tasks {
            children.push(spawn_child(&myself, scheduled).await?);
        }

        Ok(SupervisorState {
            children,
            shutting_down: false,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisorMessage::GetStatus { reply } => {
                let mut stats = Vec::with_capacity(state.children.len());
                for child in &state.children {
                    let result = ractor::rpc::call(
                        &child.actor,
                        |reply| TickMessage::GetStats { reply },
                        Some(STATS_TIMEOUT),
                    )
                    .await;
                    if let Ok(ractor::rpc::CallResult::Success(child_stats)) = result {
                        stats.push(child_stats);
                    }
                }
                let _ = reply.send(stats);
            }

            SupervisorMessage::Shutdown => {
                tracing::info!("Shutting down crawler supervisor");
                state.shutting_down = true;
                for child in &state.children {
                    let _ = child.actor.send_message(TickMessage::Shutdown);
                }
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::info!("Scheduler {} terminated: {:?}", cell.get_id(), reason);
                state.children.retain(|c| c.actor.get_id() != cell.get_id());
            }
            SupervisionEvent::ActorFailed(cell, error) => {
                tracing::warn!("Scheduler {} failed: {}", cell.get_id(), error);
                let Some(index) = state
                    .children
                    .iter()
                    .position(|c| c.actor.get_id() == cell.get_id())
                else {
                    return Ok(());
                };
                let failed = state.children.remove(index);
                if !state.shutting_down {
                    tracing::info!("Restarting {} scheduler", failed.scheduled.task.name());
                    let child = spawn_child(&myself, failed.scheduled).await?;
                    state.children.push(child);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Start the supervisor with the given tasks.
pub async fn start_supervisor(
    args: SupervisorArgs,
) -> Result<(ActorRef<SupervisorMessage>, tokio::task::JoinHandle<()>), ractor::SpawnErr> {
    let (actor, handle) =
        Actor::spawn(Some("crawler-supervisor".to_string()), Supervisor, args).await?;

    Ok((actor, handle))
}
