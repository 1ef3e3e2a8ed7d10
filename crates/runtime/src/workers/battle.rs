//! Battle worker that owns the authoritative [`Battle`].
//!
//! Receives commands from [`BattleHandle`](crate::api::BattleHandle), runs
//! actions through [`BattleEngine`], records every diff to the replay log
//! and publishes it on the event bus.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use battle_core::{
    Action, ActionOutcome, Battle, BattleDiff, BattleEngine, BattleStatus, DiffLog,
    ExecuteError, PcgRng, ShipId,
};

use crate::api::Result;
use crate::events::{DiffEvent, EventBus, PlannerEvent, TurnEvent};
use crate::planner::Maneuver;
use crate::repository::ReplayRepository;

/// Commands accepted by the battle worker
pub enum Command {
    /// Apply an action of the playing ship.
    ApplyAction {
        action: Action,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    /// Apply a planned maneuver after checking it still fits the battle.
    ApplyManeuver {
        maneuver: Maneuver,
        reply: oneshot::Sender<Result<ManeuverOutcome>>,
    },
    /// Undo the last action; replies with the number of reverted diffs.
    RevertOneAction { reply: oneshot::Sender<Result<usize>> },
    /// Clone of the live battle (read-only).
    QueryBattle { reply: oneshot::Sender<Battle> },
    /// Diffs logged from `index` on, for a peer catching up.
    DiffsSince {
        index: usize,
        reply: oneshot::Sender<Vec<BattleDiff>>,
    },
    /// Encoded battle with the generator it will draw from next.
    Snapshot {
        reply: oneshot::Sender<Result<BattleSnapshot>>,
    },
}

/// Battle state handed across the worker boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSnapshot {
    /// Bincode encoded [`Battle`].
    pub bytes: Vec<u8>,
    pub rng: PcgRng,
    /// Diff log length when the snapshot was taken.
    pub log_len: usize,
}

/// Result of an [`Command::ApplyManeuver`] request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManeuverOutcome {
    Applied(ActionOutcome),
    /// The maneuver was planned against an older state and no longer
    /// applies; the battle is unchanged.
    Stale { reason: String },
}

/// Background task processing battle commands, one at a time.
pub struct BattleWorker {
    battle: Battle,
    log: DiffLog,
    rng: PcgRng,
    replay: Option<Box<dyn ReplayRepository>>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl BattleWorker {
    /// Creates a worker over a started battle.
    ///
    /// `replay` must already hold the battle as its initial state.
    pub fn new(
        battle: Battle,
        rng: PcgRng,
        replay: Option<Box<dyn ReplayRepository>>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "runtime::worker",
            ships = battle.ships.len(),
            fleets = battle.fleets.len(),
            playing = ?battle.playing_ship_id(),
            "battle worker initialized"
        );
        Self {
            battle,
            log: DiffLog::new(),
            rng,
            replay,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop; ends when every handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
        if let Some(replay) = self.replay.as_mut() {
            if let Err(err) = replay.flush() {
                error!(target: "runtime::worker", %err, "failed to flush replay log");
            }
        }
        debug!(target: "runtime::worker", diffs = self.log.len(), "battle worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ApplyAction { action, reply } => {
                let result = self.apply(&action);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "ApplyAction reply channel closed");
                }
            }
            Command::ApplyManeuver { maneuver, reply } => {
                let result = self.apply_maneuver(&maneuver);
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "ApplyManeuver reply channel closed");
                }
            }
            Command::RevertOneAction { reply } => {
                let result = self.revert_one_action();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "RevertOneAction reply channel closed");
                }
            }
            Command::QueryBattle { reply } => {
                if reply.send(self.battle.clone()).is_err() {
                    debug!(target: "runtime::worker", "QueryBattle reply channel closed");
                }
            }
            Command::DiffsSince { index, reply } => {
                let diffs = self.log.iter_from(index).cloned().collect();
                if reply.send(diffs).is_err() {
                    debug!(target: "runtime::worker", "DiffsSince reply channel closed");
                }
            }
            Command::Snapshot { reply } => {
                let result = self.snapshot();
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Snapshot reply channel closed");
                }
            }
        }
    }

    fn snapshot(&self) -> Result<BattleSnapshot> {
        Ok(BattleSnapshot {
            bytes: self.battle.to_snapshot()?,
            rng: self.rng,
            log_len: self.log.len(),
        })
    }

    /// Applies an action and broadcasts what it changed.
    ///
    /// A rejected action is reported on the turn topic and leaves the battle
    /// untouched.
    fn apply(&mut self, action: &Action) -> Result<ActionOutcome> {
        let playing = self.battle.playing_ship_id();
        let applied =
            BattleEngine::new(&mut self.battle, &mut self.log, &mut self.rng).apply_action(action);

        let outcome = match applied {
            Ok(outcome) => outcome,
            Err(err) => {
                match &err {
                    ExecuteError::Rejected { .. } => {
                        warn!(
                            target: "runtime::worker",
                            ship = %action.ship,
                            action = %action.source,
                            reason = %err,
                            "action rejected"
                        );
                        self.event_bus.publish(TurnEvent::ActionRejected {
                            action: *action,
                            reason: err.to_string(),
                        });
                    }
                    ExecuteError::Integrity(integrity) => {
                        error!(
                            target: "runtime::worker",
                            ship = %action.ship,
                            %integrity,
                            "battle integrity violated"
                        );
                    }
                }
                return Err(err.into());
            }
        };

        self.publish_applied(outcome.diffs.clone());
        self.publish_turn_changes(playing);
        Ok(outcome)
    }

    /// Revalidates a maneuver planned on a snapshot, then applies it.
    fn apply_maneuver(&mut self, maneuver: &Maneuver) -> Result<ManeuverOutcome> {
        if let Some(reason) = self.staleness(maneuver) {
            debug!(
                target: "runtime::worker",
                ship = %maneuver.ship,
                %maneuver,
                %reason,
                "stale maneuver dropped"
            );
            self.event_bus.publish(PlannerEvent::ManeuverStale {
                ship: maneuver.ship,
                maneuver: *maneuver,
                reason: reason.clone(),
            });
            return Ok(ManeuverOutcome::Stale { reason });
        }
        self.apply(&maneuver.action()).map(ManeuverOutcome::Applied)
    }

    fn staleness(&self, maneuver: &Maneuver) -> Option<String> {
        if self.battle.status != BattleStatus::InProgress {
            return Some("battle not in progress".to_string());
        }
        if !self.battle.is_playing(maneuver.ship) {
            return Some(format!("{} is no longer playing", maneuver.ship));
        }
        BattleEngine::check_action(&self.battle, &maneuver.action())
            .err()
            .map(|err| err.to_string())
    }

    /// Undoes the last action.
    ///
    /// The replay log stays append-only: the reverted diffs are recorded as
    /// their reverses, most recent first.
    fn revert_one_action(&mut self) -> Result<usize> {
        let playing = self.battle.playing_ship_id();
        let start = self
            .log
            .as_slice()
            .iter()
            .rposition(|diff| matches!(diff, BattleDiff::ShipActionUsed { .. }));
        let undone: Vec<BattleDiff> = start
            .map(|start| self.log.iter_from(start).cloned().collect())
            .unwrap_or_default();

        let count = BattleEngine::new(&mut self.battle, &mut self.log, &mut self.rng)
            .revert_one_action()
            .map_err(ExecuteError::from)?;

        for diff in undone.iter().rev() {
            self.record(&diff.reverse());
        }
        info!(target: "runtime::worker", reverted = count, "last action undone");
        self.event_bus.publish(DiffEvent::Reverted { count });
        self.publish_turn_changes(playing);
        Ok(count)
    }

    fn publish_applied(&mut self, range: Range<usize>) {
        for index in range {
            let Some(diff) = self.log.get(index).cloned() else {
                continue;
            };
            self.record(&diff);
            self.event_bus.publish(DiffEvent::Applied { index, diff });
        }
    }

    fn publish_turn_changes(&self, previous: Option<ShipId>) {
        if let Some(outcome) = self.battle.outcome.filter(|_| self.battle.is_ended()) {
            self.event_bus.publish(TurnEvent::BattleEnded { outcome });
            return;
        }
        let current = self.battle.playing_ship_id();
        if current != previous {
            if let Some(ship) = current {
                debug!(
                    target: "runtime::worker",
                    ship = %ship,
                    cycle = self.battle.cycle,
                    "ship changed"
                );
                self.event_bus.publish(TurnEvent::ShipChanged {
                    ship,
                    cycle: self.battle.cycle,
                });
            }
        }
    }

    /// Appends a diff to the replay log. The first failure stops the
    /// recording, since a replay with a hole cannot be trusted.
    fn record(&mut self, diff: &BattleDiff) {
        let Some(replay) = self.replay.as_mut() else {
            return;
        };
        if let Err(err) = replay.append(diff) {
            error!(
                target: "runtime::worker",
                session = replay.session_id(),
                %err,
                "replay recording stopped"
            );
            self.replay = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{BattleConfig, ValueKind};

    use super::*;
    use crate::api::RuntimeError;
    use crate::blueprints::{Blueprint, skirmish};
    use crate::events::{Event, Topic};
    use crate::repository::InMemoryReplayLog;

    struct Harness {
        command_tx: mpsc::Sender<Command>,
        bus: EventBus,
        replay: InMemoryReplayLog,
        initial: Battle,
    }

    fn spawn() -> Harness {
        let mut rng = PcgRng::from_seed(11);
        let mut battle =
            skirmish(BattleConfig::default(), 1, &[Blueprint::Frigate]).unwrap();
        battle.start(&mut rng).unwrap();

        let mut replay = InMemoryReplayLog::new("worker");
        replay.save_initial(&battle).unwrap();
        let bus = EventBus::new();
        let (command_tx, command_rx) = mpsc::channel(8);
        let worker = BattleWorker::new(
            battle.clone(),
            rng,
            Some(Box::new(replay.clone())),
            command_rx,
            bus.clone(),
        );
        tokio::spawn(worker.run());
        Harness {
            command_tx,
            bus,
            replay,
            initial: battle,
        }
    }

    async fn request<T>(
        tx: &mpsc::Sender<Command>,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> T {
        let (reply, rx) = oneshot::channel();
        assert!(tx.send(command(reply)).await.is_ok());
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn applied_diffs_are_published_and_recorded() {
        let harness = spawn();
        let mut diffs = harness.bus.subscribe(Topic::Diff);
        let ship = harness.initial.playing_ship_id().unwrap();

        let outcome = request(&harness.command_tx, |reply| Command::ApplyAction {
            action: Action::end_turn(ship),
            reply,
        })
        .await
        .unwrap();

        let first = diffs.recv().await.unwrap();
        assert!(matches!(first, Event::Diff(DiffEvent::Applied { index: 0, .. })));
        assert_eq!(harness.replay.len(), outcome.diffs.len() as u64);
    }

    #[tokio::test]
    async fn rejected_action_leaves_the_battle_untouched() {
        let harness = spawn();
        let waiting = harness
            .initial
            .play_order
            .iter()
            .copied()
            .find(|&ship| !harness.initial.is_playing(ship))
            .unwrap();

        let result = request(&harness.command_tx, |reply| Command::ApplyAction {
            action: Action::end_turn(waiting),
            reply,
        })
        .await;
        assert!(matches!(result, Err(RuntimeError::Execute(ExecuteError::Rejected { .. }))));

        let battle = request(&harness.command_tx, |reply| Command::QueryBattle { reply }).await;
        assert_eq!(battle, harness.initial);
        assert!(harness.replay.is_empty());
    }

    #[tokio::test]
    async fn stale_maneuver_is_dropped() {
        let harness = spawn();
        let ship = harness.initial.playing_ship_id().unwrap();
        request(&harness.command_tx, |reply| Command::ApplyAction {
            action: Action::end_turn(ship),
            reply,
        })
        .await
        .unwrap();

        let outcome = request(&harness.command_tx, |reply| Command::ApplyManeuver {
            maneuver: Maneuver::end_turn(ship),
            reply,
        })
        .await
        .unwrap();
        assert!(matches!(outcome, ManeuverOutcome::Stale { .. }));
    }

    #[tokio::test]
    async fn revert_restores_the_battle_and_keeps_the_replay_forward() {
        let harness = spawn();
        let ship = harness.initial.playing_ship_id().unwrap();

        let outcome = request(&harness.command_tx, |reply| Command::ApplyManeuver {
            maneuver: Maneuver::end_turn(ship),
            reply,
        })
        .await
        .unwrap();
        assert!(matches!(outcome, ManeuverOutcome::Applied(_)));

        let reverted = request(&harness.command_tx, |reply| Command::RevertOneAction { reply })
            .await
            .unwrap();
        assert!(reverted > 0);

        let battle = request(&harness.command_tx, |reply| Command::QueryBattle { reply }).await;
        assert_eq!(battle, harness.initial);
        assert_eq!(
            battle.ship(ship).map(|ship| ship.value(ValueKind::Power)),
            harness.initial.ship(ship).map(|ship| ship.value(ValueKind::Power))
        );

        let replayed = crate::repository::load_replay(&harness.replay).unwrap();
        assert_eq!(replayed, battle);

        let remaining = request(&harness.command_tx, |reply| Command::DiffsSince {
            index: 0,
            reply,
        })
        .await;
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn snapshot_decodes_to_the_live_battle() {
        let harness = spawn();
        let snapshot = request(&harness.command_tx, |reply| Command::Snapshot { reply })
            .await
            .unwrap();
        assert_eq!(Battle::from_snapshot(&snapshot.bytes).unwrap(), harness.initial);
        assert_eq!(snapshot.log_len, 0);
    }
}
