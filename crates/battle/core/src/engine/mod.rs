//! Action execution pipeline and turn scheduling.
//!
//! The [`BattleEngine`] is the authoritative reducer for a started
//! [`Battle`]. Every mutation it performs is a [`BattleDiff`] applied to the
//! battle and appended to its [`DiffLog`], so the log alone is enough to
//! replay, undo or mirror the battle.
//!
//! An action goes through availability, targeting and resolution. Its diffs
//! are applied one at a time: effects are resolved against the state left
//! by the previous diffs. The post-action checks then settle area effects,
//! value bounds, deaths and victory.
mod checks;
mod errors;
#[cfg(test)]
mod laws;
mod scheduler;

pub use errors::{ActionPhase, ExecuteError, PhaseError};

use core::ops::Range;

use tracing::{debug, error, info};

use crate::action::{
    Action, ActionContext, ActionRejection, ActionSource, ActionTransition, EndTurnAction,
    ResolutionStep,
};
use crate::diff::{BattleDiff, DiffLog, IntegrityError};
use crate::effect::EffectContext;
use crate::error::ErrorContext;
use crate::rng::RandomSource;
use crate::state::{Battle, BattleStatus, Equipment, Ship, Target, ValueKind};

/// An action request that passed availability and targeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckedAction {
    pub action: Action,
    /// Target actually used, after range and obstacle adjustments.
    pub target: Target,
    /// Power consumed (negative when power is restored).
    pub cost: i64,
}

/// What an applied action left in the log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    /// Log indices of the diffs produced by the action.
    pub diffs: Range<usize>,
    pub battle_ended: bool,
}

/// Battle engine that validates actions, applies their diffs and runs the
/// post-action checks.
pub struct BattleEngine<'a> {
    battle: &'a mut Battle,
    log: &'a mut DiffLog,
    rng: &'a mut dyn RandomSource,
}

impl<'a> BattleEngine<'a> {
    pub fn new(
        battle: &'a mut Battle,
        log: &'a mut DiffLog,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self { battle, log, rng }
    }

    pub fn battle(&self) -> &Battle {
        self.battle
    }

    pub fn log(&self) -> &DiffLog {
        self.log
    }

    /// Runs availability and targeting without touching the battle.
    ///
    /// Also used to revalidate maneuvers planned against an older snapshot.
    pub fn check_action(
        battle: &Battle,
        action: &Action,
    ) -> Result<CheckedAction, PhaseError<ActionRejection>> {
        let availability = |error| PhaseError::new(ActionPhase::Availability, error);

        if battle.status != BattleStatus::InProgress {
            return Err(availability(ActionRejection::BattleNotInProgress));
        }
        if !battle.is_playing(action.ship) {
            return Err(availability(ActionRejection::ShipNotPlaying));
        }
        let ship = battle
            .ship(action.ship)
            .ok_or(availability(ActionRejection::ShipNotPlaying))?;
        let (equipment, transition) =
            resolve_transition(ship, action.source).map_err(availability)?;
        let ctx = ActionContext::new(battle, ship, equipment);

        if let Some(cooldown) = equipment.map(|equipment| equipment.cooldown) {
            if !cooldown.can_use() {
                return Err(availability(ActionRejection::Overheated {
                    turns: cooldown.heat,
                }));
            }
        }
        transition.check_availability(&ctx).map_err(availability)?;
        let power = ship.value(ValueKind::Power);
        let minimal = transition.minimal_cost(&ctx);
        if minimal > power {
            return Err(availability(ActionRejection::NotEnoughPower {
                required: minimal,
                available: power,
            }));
        }

        let target = transition
            .check_target(&ctx, action.target)
            .map_err(|error| PhaseError::new(ActionPhase::Targeting, error))?;
        let cost = transition.cost(&ctx, &target);
        if cost > 0 && cost > power {
            return Err(PhaseError::new(
                ActionPhase::Targeting,
                ActionRejection::NotEnoughPower {
                    required: cost,
                    available: power,
                },
            ));
        }

        Ok(CheckedAction {
            action: *action,
            target,
            cost,
        })
    }

    /// Applies an action of the playing ship.
    ///
    /// A rejected action leaves the battle and the log untouched. When the
    /// acting ship dies from its own action, its turn is ended right away so
    /// that it leaves the play order. That forced end of turn carries no
    /// `ShipActionUsed` of its own: it is undone with the action.
    pub fn apply_action(&mut self, action: &Action) -> Result<ActionOutcome, ExecuteError> {
        let checked = Self::check_action(self.battle, action).map_err(|error| {
            debug!(
                target: "battle::engine",
                ship = %action.ship,
                action = %action.source,
                reason = %error,
                "action rejected"
            );
            let context = ErrorContext::new(self.battle.cycle).with_ship(action.ship);
            ExecuteError::Rejected { error, context }
        })?;

        let start = self.log.len();
        self.resolve(&checked, false)?;

        if self.battle.is_playing(action.ship)
            && self
                .battle
                .ship(action.ship)
                .is_some_and(|ship| ship.value(ValueKind::Hull) <= 0)
        {
            debug!(
                target: "battle::engine",
                ship = %action.ship,
                "acting ship destroyed, ending its turn"
            );
            let end_turn = Action::end_turn(action.ship);
            let forced = Self::check_action(self.battle, &end_turn).map_err(|error| {
                let context = ErrorContext::new(self.battle.cycle)
                    .with_ship(action.ship)
                    .with_message("forced end of turn");
                ExecuteError::Rejected { error, context }
            })?;
            self.resolve(&forced, true)?;
        }

        let battle_ended = self.battle.is_ended();
        if battle_ended {
            info!(
                target: "battle::engine",
                cycle = self.battle.cycle,
                winner = ?self.battle.outcome.and_then(|outcome| outcome.winner),
                "battle ended"
            );
        }
        Ok(ActionOutcome {
            diffs: start..self.log.len(),
            battle_ended,
        })
    }

    /// Reverts the diffs of the last action, and drops them from the log.
    ///
    /// An action spans from its `ShipActionUsed` to the end of the log,
    /// including the end of turn forced by the acting ship's death.
    ///
    /// Returns the number of reverted diffs.
    pub fn revert_one_action(&mut self) -> Result<usize, IntegrityError> {
        let start = self
            .log
            .as_slice()
            .iter()
            .rposition(|diff| matches!(diff, BattleDiff::ShipActionUsed { .. }))
            .ok_or(IntegrityError::NothingToRevert)?;
        let count = self.log.len() - start;
        for index in (start..self.log.len()).rev() {
            let Some(diff) = self.log.get(index) else {
                continue;
            };
            diff.revert(self.battle).inspect_err(|err| {
                error!(
                    target: "battle::engine",
                    index,
                    kind = diff.as_ref(),
                    %err,
                    "revert failed"
                );
            })?;
        }
        self.log.truncate(start);
        debug!(target: "battle::engine", reverted = count, "action reverted");
        Ok(count)
    }

    /// Applies a diff and appends it to the log.
    pub(crate) fn apply_diff(&mut self, diff: BattleDiff) -> Result<(), IntegrityError> {
        diff.apply(self.battle).inspect_err(|err| {
            error!(
                target: "battle::engine",
                index = self.log.len(),
                kind = diff.as_ref(),
                %err,
                "diff rejected by the battle"
            );
        })?;
        self.log.add(diff);
        Ok(())
    }

    pub(crate) fn apply_diffs(
        &mut self,
        diffs: impl IntoIterator<Item = BattleDiff>,
    ) -> Result<bool, IntegrityError> {
        let mut applied = false;
        for diff in diffs {
            self.apply_diff(diff)?;
            applied = true;
        }
        Ok(applied)
    }

    /// Applies a checked action: use marker, power, resolution, checks and
    /// end marker. A `forced` action has no use marker.
    fn resolve(&mut self, checked: &CheckedAction, forced: bool) -> Result<(), IntegrityError> {
        let action = checked.action;
        let (used, power, steps) = {
            let battle: &Battle = self.battle;
            let ship = battle
                .ship(action.ship)
                .ok_or(IntegrityError::ShipNotFound(action.ship))?;
            let (equipment, transition) = resolve_transition(ship, action.source)
                .map_err(|_| IntegrityError::NotPlayingShip { ship: action.ship })?;
            let heat = equipment.map_or(0, |equipment| {
                let mut cooldown = equipment.cooldown;
                cooldown.use_once()
            });
            let used = BattleDiff::ShipActionUsed {
                ship: action.ship,
                action: action.source,
                target: checked.target,
                heat,
            };
            let power = ship.value_diffs(ValueKind::Power, -checked.cost);
            let ctx = ActionContext::new(battle, ship, equipment);
            (used, power, transition.resolution(&ctx, &checked.target))
        };

        debug!(
            target: "battle::engine",
            ship = %action.ship,
            action = %action.source,
            at = %checked.target,
            cost = checked.cost,
            "applying action"
        );

        if !forced {
            self.apply_diff(used)?;
        }
        self.apply_diffs(power)?;
        for step in steps {
            self.apply_step(step)?;
        }
        self.run_checks()?;
        self.apply_diff(BattleDiff::ShipActionEnded {
            ship: action.ship,
            action: action.source,
            target: checked.target,
        })
    }

    fn apply_step(&mut self, step: ResolutionStep) -> Result<(), IntegrityError> {
        match step {
            ResolutionStep::Diff(diff) => self.apply_diff(diff),
            ResolutionStep::Effect {
                effect,
                target,
                source,
                index,
            } => {
                let diffs = {
                    let battle: &Battle = self.battle;
                    match battle.ship(target).filter(|ship| ship.alive) {
                        Some(ship) => {
                            let mut ctx = EffectContext::new(battle, &mut *self.rng, source, index);
                            effect.on_diffs(&mut ctx, ship)
                        }
                        None => Vec::new(),
                    }
                };
                self.apply_diffs(diffs).map(|_| ())
            }
        }
    }
}

/// Equipment and transition behind an action source.
fn resolve_transition(
    ship: &Ship,
    source: ActionSource,
) -> Result<(Option<&Equipment>, &dyn ActionTransition), ActionRejection> {
    match source {
        ActionSource::EndTurn => Ok((None, &EndTurnAction)),
        ActionSource::Equipment(id) => {
            let equipment = ship.equipment(id).ok_or(ActionRejection::EquipmentNotFound)?;
            let action = equipment
                .action
                .as_ref()
                .ok_or(ActionRejection::EquipmentNotFound)?;
            Ok((Some(equipment), action.transition()))
        }
    }
}
