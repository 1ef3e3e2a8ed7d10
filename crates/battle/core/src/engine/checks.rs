//! Post-action consistency checks.
//!
//! Each pass looks at one category at a time and stops at the first one that
//! produced diffs, so later categories always see a settled state:
//!
//! 1. area effects (toggles and drones) match ship positions
//! 2. values lie within `[0, capacity]`
//! 3. the first destroyed non-playing ship dies
//! 4. a battle with a single fleet standing ends

use tracing::{debug, error};

use crate::diff::{BattleDiff, IntegrityError};
use crate::effect::{ActiveEffect, EffectContext, EffectKey, expected_area_effects};
use crate::state::{Battle, FleetId, ShipId, ValueKind};

use super::BattleEngine;

impl BattleEngine<'_> {
    /// Runs check passes until one produces no diff.
    pub(crate) fn run_checks(&mut self) -> Result<(), IntegrityError> {
        let loops = self.battle.config.max_check_loops;
        for _ in 0..loops {
            if self.battle.is_ended() || !self.check_pass()? {
                return Ok(());
            }
        }
        error!(target: "battle::checks", loops, "checks did not settle");
        Err(IntegrityError::ChecksDidNotSettle { loops })
    }

    fn check_pass(&mut self) -> Result<bool, IntegrityError> {
        if self.check_area_effects()? {
            return Ok(true);
        }
        if self.check_value_bounds()? {
            return Ok(true);
        }
        if self.check_dead_ships()? {
            return Ok(true);
        }
        self.check_victory()
    }

    // ========================================================================
    // Area effects
    // ========================================================================

    fn check_area_effects(&mut self) -> Result<bool, IntegrityError> {
        let ships: Vec<ShipId> = self.battle.iter_alive_ships().map(|ship| ship.id).collect();
        let mut changed = false;
        for ship in ships {
            changed |= self.remove_obsolete_area_effects(ship)?;
            changed |= self.add_missing_area_effects(ship)?;
        }
        Ok(changed)
    }

    fn remove_obsolete_area_effects(&mut self, ship: ShipId) -> Result<bool, IntegrityError> {
        let obsolete: Vec<EffectKey> = {
            let Some(current) = self.battle.ship(ship) else {
                return Ok(false);
            };
            let expected = expected_area_effects(self.battle, current);
            current
                .active_effects
                .iter()
                .filter(|effect| !effect.key.is_sticky())
                .filter(|effect| {
                    expected
                        .binary_search_by(|(key, _)| key.cmp(&effect.key))
                        .is_err()
                })
                .map(|effect| effect.key)
                .collect()
        };

        let mut changed = false;
        for key in obsolete {
            let diffs = match self.battle.ship(ship) {
                Some(current) => current
                    .effect(&key)
                    .map(|effect| effect.removal_diffs(current))
                    .unwrap_or_default(),
                None => Vec::new(),
            };
            changed |= self.apply_diffs(diffs)?;
        }
        Ok(changed)
    }

    fn add_missing_area_effects(&mut self, ship: ShipId) -> Result<bool, IntegrityError> {
        let missing: Vec<ActiveEffect> = {
            let Some(current) = self.battle.ship(ship) else {
                return Ok(false);
            };
            expected_area_effects(self.battle, current)
                .into_iter()
                .filter(|(key, _)| current.effect(key).is_none())
                .map(|(key, effect)| ActiveEffect {
                    key,
                    effect: effect.clone(),
                    remaining: None,
                })
                .collect()
        };

        let mut changed = false;
        for effect in missing {
            let key = effect.key;
            let (source, index) = match key {
                EffectKey::Area { source, index } | EffectKey::Sticky { source, index } => {
                    (source, index)
                }
            };
            let kind = effect.effect.clone();
            self.apply_diff(BattleDiff::ShipEffectAdded { ship, effect })?;
            let diffs = {
                let battle: &Battle = self.battle;
                match battle.ship(ship) {
                    Some(current) => {
                        let mut ctx = EffectContext::new(battle, &mut *self.rng, source, index);
                        kind.on_diffs(&mut ctx, current)
                    }
                    None => Vec::new(),
                }
            };
            self.apply_diffs(diffs)?;
            changed = true;
        }
        Ok(changed)
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn check_value_bounds(&mut self) -> Result<bool, IntegrityError> {
        let diffs: Vec<BattleDiff> = self
            .battle
            .iter_alive_ships()
            .flat_map(|ship| {
                [ValueKind::Hull, ValueKind::Shield, ValueKind::Power]
                    .into_iter()
                    .filter_map(move |kind| {
                        let value = ship.value(kind);
                        let bounded = value.clamp(0, ship.capacity(kind));
                        (bounded != value).then_some(BattleDiff::ShipValue {
                            ship: ship.id,
                            value: kind,
                            delta: bounded - value,
                        })
                    })
            })
            .collect();
        self.apply_diffs(diffs)
    }

    // ========================================================================
    // Deaths
    // ========================================================================

    fn check_dead_ships(&mut self) -> Result<bool, IntegrityError> {
        let playing = self.battle.playing_ship_id();
        let dead = self
            .battle
            .iter_alive_ships()
            .find(|ship| Some(ship.id) != playing && ship.value(ValueKind::Hull) <= 0)
            .map(|ship| ship.id);
        match dead {
            Some(ship) => {
                self.kill_ship(ship)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Strips a ship of its effects, drones and values, then removes it
    /// from the play order.
    fn kill_ship(&mut self, ship: ShipId) -> Result<(), IntegrityError> {
        debug!(target: "battle::checks", ship = %ship, cycle = self.battle.cycle, "ship destroyed");

        let keys: Vec<EffectKey> = self
            .battle
            .ship(ship)
            .ok_or(IntegrityError::ShipNotFound(ship))?
            .active_effects
            .iter()
            .map(|effect| effect.key)
            .collect();
        for key in keys {
            let diffs = match self.battle.ship(ship) {
                Some(current) => current
                    .effect(&key)
                    .map(|effect| effect.removal_diffs(current))
                    .unwrap_or_default(),
                None => Vec::new(),
            };
            self.apply_diffs(diffs)?;
        }

        let drones: Vec<BattleDiff> = self
            .battle
            .drones_of(ship)
            .map(|drone| BattleDiff::DroneDestroyed {
                drone: drone.clone(),
            })
            .collect();
        self.apply_diffs(drones)?;

        let (values, play_index) = {
            let current = self.battle.ship(ship).ok_or(IntegrityError::ShipNotFound(ship))?;
            let values: Vec<BattleDiff> = [ValueKind::Hull, ValueKind::Shield, ValueKind::Power]
                .into_iter()
                .flat_map(|kind| current.value_set_diffs(kind, 0))
                .collect();
            let play_index = self
                .battle
                .play_order
                .iter()
                .position(|id| *id == ship)
                .ok_or(IntegrityError::PlayOrderMismatch {
                    ship,
                    index: self.battle.play_order.len(),
                })?;
            (values, play_index)
        };
        self.apply_diffs(values)?;
        self.apply_diff(BattleDiff::ShipDeath { ship, play_index })
    }

    // ========================================================================
    // Victory
    // ========================================================================

    fn check_victory(&mut self) -> Result<bool, IntegrityError> {
        let standing: Vec<FleetId> = self
            .battle
            .fleets
            .iter()
            .filter(|fleet| self.battle.fleet_is_alive(fleet.id))
            .map(|fleet| fleet.id)
            .collect();
        if standing.len() > 1 {
            return Ok(false);
        }
        let winner = standing.first().copied();
        debug!(
            target: "battle::checks",
            winner = ?winner,
            cycle = self.battle.cycle,
            "single fleet standing"
        );
        self.apply_diff(BattleDiff::BattleEnded {
            winner,
            cycle: self.battle.cycle,
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{Action, ActionFilter, ToggleAction, VigilanceAction};
    use crate::diff::{BattleDiff, DiffLog};
    use crate::effect::{AttributeEffect, DamageEffect, EffectKey, EffectSource};
    use crate::engine::BattleEngine;
    use crate::rng::SkewedRandom;
    use crate::state::{AttributeKind, Target, ValueKind};
    use crate::testing::{SHIP_A, SHIP_B, add_action, add_engine, started_battle};

    #[test]
    fn toggle_area_follows_activation() {
        let mut battle = started_battle();
        let mut log = DiffLog::new();
        let mut rng = SkewedRandom::constant(0.0);
        let field = add_action(
            &mut battle,
            SHIP_A,
            ToggleAction::new(2, 500.0)
                .with_filter(ActionFilter::Enemies)
                .with_effect(AttributeEffect::new(AttributeKind::Precision, -2)),
        );
        let key = EffectKey::Area {
            source: EffectSource::Equipment {
                ship: SHIP_A,
                equipment: field,
            },
            index: 0,
        };
        let toggle = Action::equipment(SHIP_A, field, Target::Ship(SHIP_A));

        let mut engine = BattleEngine::new(&mut battle, &mut log, &mut rng);
        engine.apply_action(&toggle).expect("toggle on");
        let enemy = engine.battle().ship(SHIP_B).expect("ship");
        assert!(enemy.effect(&key).is_some());
        assert_eq!(enemy.attribute(AttributeKind::Precision), -2);
        assert!(engine.battle().ship(SHIP_A).expect("ship").effect(&key).is_none());

        engine.apply_action(&toggle).expect("toggle off");
        let enemy = engine.battle().ship(SHIP_B).expect("ship");
        assert!(enemy.effect(&key).is_none());
        assert_eq!(enemy.attribute(AttributeKind::Precision), 0);
        assert_eq!(engine.battle().ship(SHIP_A).expect("ship").value(ValueKind::Power), 10);
    }

    #[test]
    fn vigilance_punishes_intruders_then_switches_off() {
        let mut battle = started_battle();
        let mut log = DiffLog::new();
        let mut rng = SkewedRandom::constant(0.0);
        // A at (100, 100), B at (500, 100): B starts outside the watched area
        let watch = add_action(
            &mut battle,
            SHIP_A,
            VigilanceAction::new(
                ToggleAction::new(1, 350.0).with_filter(ActionFilter::Enemies),
                1,
                vec![DamageEffect::new(7, 0).into()],
            ),
        );
        let thrusters = add_engine(&mut battle, SHIP_B, 10.0);
        let key = EffectKey::Area {
            source: EffectSource::Equipment {
                ship: SHIP_A,
                equipment: watch,
            },
            index: 0,
        };

        let mut engine = BattleEngine::new(&mut battle, &mut log, &mut rng);
        engine
            .apply_action(&Action::equipment(SHIP_A, watch, Target::Ship(SHIP_A)))
            .expect("watch");
        engine.apply_action(&Action::end_turn(SHIP_A)).expect("end turn");
        assert!(engine.battle().ship(SHIP_B).expect("ship").effect(&key).is_none());

        engine
            .apply_action(&Action::equipment(
                SHIP_B,
                thrusters,
                Target::location(420.0, 100.0),
            ))
            .expect("move in");
        let intruder = engine.battle().ship(SHIP_B).expect("ship");
        assert_eq!(intruder.value(ValueKind::Hull), 93);
        assert!(intruder.effect(&key).is_none());
        let equipment = engine
            .battle()
            .ship(SHIP_A)
            .and_then(|ship| ship.equipment(watch))
            .expect("watch");
        assert!(!equipment.toggle.activated);
        assert!(
            engine
                .log()
                .as_slice()
                .iter()
                .any(|diff| matches!(
                    diff,
                    BattleDiff::VigilanceTriggered { intruder, .. } if *intruder == SHIP_B
                ))
        );
    }

    #[test]
    fn value_bounds_are_restored() {
        let mut battle = started_battle();
        battle.ship_mut(SHIP_B).expect("ship").values.shield = 12;
        battle.ship_mut(SHIP_B).expect("ship").values.power = -3;
        let mut log = DiffLog::new();
        let mut rng = SkewedRandom::constant(0.0);
        let mut engine = BattleEngine::new(&mut battle, &mut log, &mut rng);
        engine.run_checks().expect("checks");
        let ship = engine.battle().ship(SHIP_B).expect("ship");
        assert_eq!(ship.value(ValueKind::Shield), 0);
        assert_eq!(ship.value(ValueKind::Power), 0);
    }
}
