//! Battle runtime orchestrator.
//!
//! [`BattleRuntime`] spawns the battle worker and the planner worker, then
//! drives the playing ship of each turn: AI fleets through planning
//! requests, human fleets through their [`ActionProvider`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use battle_core::{
    Action, Battle, BattleOutcome, BattleStatus, ExecuteError, FleetId, PcgRng, PlayerKind, ShipId,
};

use crate::api::{ActionProvider, BattleHandle, Result, RuntimeError};
use crate::events::{EventBus, PlannerEvent};
use crate::planner::{PlannerConfig, ScoredManeuver, TacticalPlanner};
use crate::repository::ReplayRepository;
use crate::workers::{BattleWorker, ManeuverOutcome, PlanRequest, PlanResponse, PlannerWorker};

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    pub planner_buffer_size: usize,
    /// Time a planning request may take before the ship ends its turn.
    pub planner_timeout: Duration,
    pub planner: PlannerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: EventBus::DEFAULT_CAPACITY,
            command_buffer_size: 32,
            planner_buffer_size: 8,
            planner_timeout: Duration::from_secs(2),
            planner: PlannerConfig::default(),
        }
    }
}

/// What [`BattleRuntime::run_to_completion`] ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// `None` when the cycle cap was hit first.
    pub outcome: Option<BattleOutcome>,
    pub cycle: u32,
    /// Actions applied (maneuvers and provided actions, fallbacks included).
    pub actions: u64,
    /// Turns ended for a ship because no usable plan came back.
    pub fallbacks: u64,
}

/// Main runtime orchestrator
pub struct BattleRuntime {
    handle: BattleHandle,
    config: RuntimeConfig,
    providers: HashMap<FleetId, Box<dyn ActionProvider>>,
    planner_tx: mpsc::Sender<PlanRequest>,
    next_request: u64,
    battle_worker: JoinHandle<()>,
    planner_worker: JoinHandle<()>,
}

impl BattleRuntime {
    pub fn builder() -> BattleRuntimeBuilder {
        BattleRuntimeBuilder::new()
    }

    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Plays turns until the battle ends or `max_cycles` is exceeded.
    pub async fn run_to_completion(&mut self, max_cycles: u32) -> Result<RunSummary> {
        let mut summary = RunSummary {
            outcome: None,
            cycle: 0,
            actions: 0,
            fallbacks: 0,
        };
        let mut turn: Option<(ShipId, u32)> = None;
        let mut maneuvers = 0u32;

        loop {
            let battle = self.handle.query_battle().await?;
            summary.cycle = battle.cycle;
            if battle.is_ended() {
                summary.outcome = battle.outcome;
                break;
            }
            if battle.cycle > max_cycles {
                warn!(target: "runtime::worker", max_cycles, "cycle cap reached");
                break;
            }

            let ship = battle.playing_ship_id().ok_or(RuntimeError::NoPlayingShip)?;
            if turn != Some((ship, battle.cycle)) {
                turn = Some((ship, battle.cycle));
                maneuvers = 0;
            }

            let step = self.step(&battle, ship, maneuvers).await?;
            maneuvers += 1;
            match step {
                Step::Applied => summary.actions += 1,
                Step::Fallback => {
                    summary.actions += 1;
                    summary.fallbacks += 1;
                }
                Step::Retry => {}
            }
        }

        info!(
            target: "runtime::worker",
            winner = ?summary.outcome.and_then(|outcome| outcome.winner),
            cycle = summary.cycle,
            actions = summary.actions,
            fallbacks = summary.fallbacks,
            "run finished"
        );
        Ok(summary)
    }

    /// One action of `ship`, the `maneuvers`-th of its turn.
    async fn step(&mut self, battle: &Battle, ship: ShipId, maneuvers: u32) -> Result<Step> {
        if maneuvers >= self.config.planner.max_maneuvers_per_turn {
            return self.fallback(ship, "maneuver cap reached").await;
        }
        let player = battle
            .ship(ship)
            .and_then(|playing| battle.fleet(playing.fleet))
            .map(|fleet| (fleet.id, fleet.player))
            .ok_or(RuntimeError::NoPlayingShip)?;

        match player {
            (_, PlayerKind::Ai) => self.ai_step(ship).await,
            (fleet, PlayerKind::Human) => {
                let provider = self
                    .providers
                    .get(&fleet)
                    .ok_or(RuntimeError::ProviderNotSet { fleet })?;
                let action = provider.provide_action(ship, battle).await?;
                match self.handle.apply_action(action).await {
                    Ok(_) => Ok(Step::Applied),
                    Err(RuntimeError::Execute(ExecuteError::Rejected { error, .. })) => {
                        self.fallback(ship, &error.to_string()).await
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    async fn ai_step(&mut self, ship: ShipId) -> Result<Step> {
        let scored = match self.request_plan(ship).await? {
            PlanResponse::Maneuver(scored) => scored,
            PlanResponse::NoManeuver => {
                debug!(target: "runtime::planner", ship = %ship, "ship left play before planning");
                return Ok(Step::Retry);
            }
            PlanResponse::Rejected(reason) => return self.fallback(ship, &reason).await,
        };
        self.apply_planned(scored).await
    }

    async fn apply_planned(&mut self, scored: ScoredManeuver) -> Result<Step> {
        let ScoredManeuver { maneuver, score } = scored;
        self.handle.event_bus().publish(PlannerEvent::ManeuverChosen {
            ship: maneuver.ship,
            maneuver,
            score,
        });
        match self.handle.apply_maneuver(maneuver).await? {
            ManeuverOutcome::Applied(_) => Ok(Step::Applied),
            ManeuverOutcome::Stale { .. } => Ok(Step::Retry),
        }
    }

    /// Sends the current snapshot to the planner and waits for its answer,
    /// at most `planner_timeout`.
    ///
    /// A planner that timed out or went away yields a rejection, so that the
    /// ship ends its turn instead of stalling the battle.
    async fn request_plan(&mut self, ship: ShipId) -> Result<PlanResponse> {
        let snapshot = self.handle.snapshot().await?;
        let request_id = self.next_request;
        self.next_request += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        let (reply, reply_rx) = oneshot::channel();
        let request = PlanRequest {
            request_id,
            snapshot: snapshot.bytes,
            rng: snapshot.rng,
            ship,
            cancel: Arc::clone(&cancel),
            reply,
        };
        if self.planner_tx.send(request).await.is_err() {
            warn!(target: "runtime::planner", request_id, ship = %ship, "planner worker stopped");
            return Ok(PlanResponse::Rejected(RuntimeError::PlannerUnavailable.to_string()));
        }

        match tokio::time::timeout(self.config.planner_timeout, reply_rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => {
                warn!(
                    target: "runtime::planner",
                    request_id,
                    ship = %ship,
                    "planner dropped the request"
                );
                Ok(PlanResponse::Rejected(RuntimeError::PlannerUnavailable.to_string()))
            }
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(target: "runtime::planner", request_id, ship = %ship, "planning timed out");
                Ok(PlanResponse::Rejected("planner timed out".to_string()))
            }
        }
    }

    /// Ends the turn of `ship` in place of the action it could not get.
    async fn fallback(&mut self, ship: ShipId, reason: &str) -> Result<Step> {
        info!(target: "runtime::planner", ship = %ship, reason, "ending turn");
        self.handle.event_bus().publish(PlannerEvent::Fallback {
            ship,
            reason: reason.to_string(),
        });
        self.handle.apply_action(Action::end_turn(ship)).await?;
        Ok(Step::Fallback)
    }

    /// Stops the workers; the replay log is flushed by the battle worker.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        drop(self.planner_tx);
        self.battle_worker.await.map_err(RuntimeError::WorkerJoin)?;
        self.planner_worker.await.map_err(RuntimeError::WorkerJoin)?;
        Ok(())
    }
}

enum Step {
    Applied,
    Fallback,
    /// Nothing applied; the battle moved on while planning.
    Retry,
}

/// Builder for [`BattleRuntime`]
pub struct BattleRuntimeBuilder {
    config: RuntimeConfig,
    battle: Option<Battle>,
    seed: u64,
    replay: Option<Box<dyn ReplayRepository>>,
    providers: HashMap<FleetId, Box<dyn ActionProvider>>,
}

impl BattleRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            battle: None,
            seed: 0,
            replay: None,
            providers: HashMap::new(),
        }
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Battle to run; started on build if it was not already.
    pub fn battle(mut self, battle: Battle) -> Self {
        self.battle = Some(battle);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replay log receiving the started battle and every diff.
    pub fn replay(mut self, replay: impl ReplayRepository + 'static) -> Self {
        self.replay = Some(Box::new(replay));
        self
    }

    /// Action source for the ships of a human fleet.
    pub fn provider(mut self, fleet: FleetId, provider: impl ActionProvider + 'static) -> Self {
        self.providers.insert(fleet, Box::new(provider));
        self
    }

    pub async fn build(self) -> Result<BattleRuntime> {
        let mut battle = self.battle.ok_or(RuntimeError::MissingBattle)?;
        let unprovided = battle.fleets.iter().find(|fleet| {
            fleet.player == PlayerKind::Human && !self.providers.contains_key(&fleet.id)
        });
        if let Some(fleet) = unprovided {
            return Err(RuntimeError::ProviderNotSet { fleet: fleet.id });
        }

        let mut rng = PcgRng::from_seed(self.seed);
        if battle.status == BattleStatus::NotStarted {
            battle.start(&mut rng)?;
        }
        let mut replay = self.replay;
        if let Some(replay) = replay.as_mut() {
            replay.save_initial(&battle)?;
        }

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (planner_tx, planner_rx) = mpsc::channel(self.config.planner_buffer_size);

        let battle_worker = BattleWorker::new(battle, rng, replay, command_rx, event_bus.clone());
        let planner_worker =
            PlannerWorker::new(TacticalPlanner::new(self.config.planner.clone()), planner_rx);

        Ok(BattleRuntime {
            handle: BattleHandle::new(command_tx, event_bus),
            config: self.config,
            providers: self.providers,
            planner_tx,
            next_request: 0,
            battle_worker: tokio::spawn(battle_worker.run()),
            planner_worker: tokio::spawn(planner_worker.run()),
        })
    }
}

#[cfg(test)]
mod tests {
    use battle_core::BattleConfig;

    use super::*;
    use crate::blueprints::{Blueprint, skirmish};

    #[tokio::test]
    async fn lost_planner_ends_turns_instead_of_failing() {
        let battle = skirmish(BattleConfig::default(), 1, &[Blueprint::Frigate]).unwrap();
        let mut runtime = BattleRuntime::builder()
            .battle(battle)
            .seed(4)
            .build()
            .await
            .unwrap();
        runtime.planner_worker.abort();
        assert!((&mut runtime.planner_worker).await.is_err());

        let summary = runtime.run_to_completion(2).await.unwrap();
        assert!(summary.outcome.is_none());
        assert!(summary.actions > 0);
        assert_eq!(summary.fallbacks, summary.actions);
    }
}
