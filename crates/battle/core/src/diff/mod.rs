//! Reversible battle mutations.
//!
//! A [`BattleDiff`] is the only way a started battle changes. Every variant
//! references its subjects by id, knows how to apply itself, and produces an
//! exact inverse with [`BattleDiff::reverse`]. Applying a diff then its reverse
//! restores the previous state bit for bit, which is what undo, replay and
//! remote peers rely on.
//!
//! Informational variants (damage report, projectile, action end) leave the
//! state untouched but keep their place in the stream for observers.
mod errors;
mod log;

pub use errors::IntegrityError;
pub use log::{DiffLog, DiffLogClient};

use crate::action::ActionSource;
use crate::effect::ActiveEffect;
use crate::state::{
    ArenaLocationAngle, AttributeKind, AttributeModifier, Battle, BattleOutcome, BattleStatus,
    Drone, EquipmentId, FleetId, Ship, ShipId, Target, ValueKind,
};

/// A single reversible change of the battle state.
#[derive(Clone, Debug, PartialEq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleDiff {
    // ========================================================================
    // Ship values and attributes
    // ========================================================================
    ShipValue {
        ship: ShipId,
        value: ValueKind,
        delta: i64,
    },
    ShipAttribute {
        ship: ShipId,
        attribute: AttributeKind,
        added: Option<AttributeModifier>,
        removed: Option<AttributeModifier>,
    },
    /// Damage report, the value changes follow as separate diffs.
    ShipDamage {
        ship: ShipId,
        hull: i64,
        shield: i64,
        evaded: i64,
        theoretical: i64,
    },

    // ========================================================================
    // Ship life and turns
    // ========================================================================
    ShipDeath {
        ship: ShipId,
        play_index: usize,
    },
    ShipRevive {
        ship: ShipId,
        play_index: usize,
    },
    /// The playing ship hands over to `new_ship`.
    ShipChange {
        ship: ShipId,
        new_ship: ShipId,
        cycle_diff: i32,
    },
    ShipMove {
        ship: ShipId,
        start: ArenaLocationAngle,
        end: ArenaLocationAngle,
    },

    // ========================================================================
    // Actions
    // ========================================================================
    ShipCooldown {
        ship: ShipId,
        equipment: EquipmentId,
        heat: i32,
        uses: i32,
    },
    /// Opens every action in the log; `heat` is what the use added.
    ShipActionUsed {
        ship: ShipId,
        action: ActionSource,
        target: Target,
        heat: u32,
    },
    ShipActionRewound {
        ship: ShipId,
        action: ActionSource,
        target: Target,
        heat: u32,
    },
    ShipActionToggle {
        ship: ShipId,
        equipment: EquipmentId,
        activated: bool,
        intrusions: u32,
    },
    ShipActionEnded {
        ship: ShipId,
        action: ActionSource,
        target: Target,
    },
    ProjectileFired {
        ship: ShipId,
        equipment: EquipmentId,
        target: Target,
    },

    // ========================================================================
    // Effects
    // ========================================================================
    ShipEffectAdded {
        ship: ShipId,
        effect: ActiveEffect,
    },
    ShipEffectRemoved {
        ship: ShipId,
        effect: ActiveEffect,
    },
    ShipEffectChanged {
        ship: ShipId,
        before: ActiveEffect,
        after: ActiveEffect,
    },
    VigilanceTriggered {
        ship: ShipId,
        equipment: EquipmentId,
        intruder: ShipId,
    },
    VigilanceRewound {
        ship: ShipId,
        equipment: EquipmentId,
        intruder: ShipId,
    },

    // ========================================================================
    // Drones
    // ========================================================================
    DroneDeployed {
        drone: Drone,
    },
    DroneDestroyed {
        drone: Drone,
    },
    DroneChanged {
        before: Drone,
        after: Drone,
    },

    // ========================================================================
    // Battle
    // ========================================================================
    BattleEnded {
        winner: Option<FleetId>,
        cycle: u32,
    },
    BattleResumed {
        winner: Option<FleetId>,
        cycle: u32,
    },
}

impl BattleDiff {
    /// Diffs that do not touch the state.
    pub const fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::ShipDamage { .. } | Self::ShipActionEnded { .. } | Self::ProjectileFired { .. }
        )
    }

    /// Primary ship concerned by the diff, if any.
    pub fn ship(&self) -> Option<ShipId> {
        match self {
            Self::ShipValue { ship, .. }
            | Self::ShipAttribute { ship, .. }
            | Self::ShipDamage { ship, .. }
            | Self::ShipDeath { ship, .. }
            | Self::ShipRevive { ship, .. }
            | Self::ShipChange { ship, .. }
            | Self::ShipMove { ship, .. }
            | Self::ShipCooldown { ship, .. }
            | Self::ShipActionUsed { ship, .. }
            | Self::ShipActionRewound { ship, .. }
            | Self::ShipActionToggle { ship, .. }
            | Self::ShipActionEnded { ship, .. }
            | Self::ProjectileFired { ship, .. }
            | Self::ShipEffectAdded { ship, .. }
            | Self::ShipEffectRemoved { ship, .. }
            | Self::ShipEffectChanged { ship, .. }
            | Self::VigilanceTriggered { ship, .. }
            | Self::VigilanceRewound { ship, .. } => Some(*ship),
            Self::DroneDeployed { drone } | Self::DroneDestroyed { drone } => Some(drone.owner),
            Self::DroneChanged { after, .. } => Some(after.owner),
            Self::BattleEnded { .. } | Self::BattleResumed { .. } => None,
        }
    }

    /// The diff undoing this one.
    pub fn reverse(&self) -> BattleDiff {
        match self.clone() {
            Self::ShipValue { ship, value, delta } => Self::ShipValue {
                ship,
                value,
                delta: -delta,
            },
            Self::ShipAttribute {
                ship,
                attribute,
                added,
                removed,
            } => Self::ShipAttribute {
                ship,
                attribute,
                added: removed,
                removed: added,
            },
            diff @ Self::ShipDamage { .. } => diff,
            Self::ShipDeath { ship, play_index } => Self::ShipRevive { ship, play_index },
            Self::ShipRevive { ship, play_index } => Self::ShipDeath { ship, play_index },
            Self::ShipChange {
                ship,
                new_ship,
                cycle_diff,
            } => Self::ShipChange {
                ship: new_ship,
                new_ship: ship,
                cycle_diff: -cycle_diff,
            },
            Self::ShipMove { ship, start, end } => Self::ShipMove {
                ship,
                start: end,
                end: start,
            },
            Self::ShipCooldown {
                ship,
                equipment,
                heat,
                uses,
            } => Self::ShipCooldown {
                ship,
                equipment,
                heat: -heat,
                uses: -uses,
            },
            Self::ShipActionUsed {
                ship,
                action,
                target,
                heat,
            } => Self::ShipActionRewound {
                ship,
                action,
                target,
                heat,
            },
            Self::ShipActionRewound {
                ship,
                action,
                target,
                heat,
            } => Self::ShipActionUsed {
                ship,
                action,
                target,
                heat,
            },
            Self::ShipActionToggle {
                ship,
                equipment,
                activated,
                intrusions,
            } => Self::ShipActionToggle {
                ship,
                equipment,
                activated: !activated,
                intrusions,
            },
            diff @ (Self::ShipActionEnded { .. } | Self::ProjectileFired { .. }) => diff,
            Self::ShipEffectAdded { ship, effect } => Self::ShipEffectRemoved { ship, effect },
            Self::ShipEffectRemoved { ship, effect } => Self::ShipEffectAdded { ship, effect },
            Self::ShipEffectChanged {
                ship,
                before,
                after,
            } => Self::ShipEffectChanged {
                ship,
                before: after,
                after: before,
            },
            Self::VigilanceTriggered {
                ship,
                equipment,
                intruder,
            } => Self::VigilanceRewound {
                ship,
                equipment,
                intruder,
            },
            Self::VigilanceRewound {
                ship,
                equipment,
                intruder,
            } => Self::VigilanceTriggered {
                ship,
                equipment,
                intruder,
            },
            Self::DroneDeployed { drone } => Self::DroneDestroyed { drone },
            Self::DroneDestroyed { drone } => Self::DroneDeployed { drone },
            Self::DroneChanged { before, after } => Self::DroneChanged {
                before: after,
                after: before,
            },
            Self::BattleEnded { winner, cycle } => Self::BattleResumed { winner, cycle },
            Self::BattleResumed { winner, cycle } => Self::BattleEnded { winner, cycle },
        }
    }

    /// Undoes this diff, assuming it was the last one applied.
    pub fn revert(&self, battle: &mut Battle) -> Result<(), IntegrityError> {
        self.reverse().apply(battle)
    }

    /// Applies the diff to the battle.
    pub fn apply(&self, battle: &mut Battle) -> Result<(), IntegrityError> {
        if self.is_informational() {
            return Ok(());
        }
        let required = match self {
            Self::BattleResumed { .. } => BattleStatus::Ended,
            _ => BattleStatus::InProgress,
        };
        if battle.status != required {
            return Err(IntegrityError::BattleNotInProgress {
                status: battle.status,
            });
        }

        match self {
            Self::ShipValue { ship, value, delta } => {
                let target = ship_mut(battle, *ship)?;
                let current = target.values.get_mut(*value);
                *current = current
                    .checked_add(*delta)
                    .ok_or(IntegrityError::ValueOverflow {
                        ship: *ship,
                        value: *value,
                    })?;
            }
            Self::ShipAttribute {
                ship,
                attribute,
                added,
                removed,
            } => {
                let target = ship_mut(battle, *ship)?;
                let resolved = target.attributes.get_mut(*attribute);
                if let Some(modifier) = removed {
                    if !resolved.remove_modifier(*modifier) {
                        return Err(IntegrityError::ModifierNotFound {
                            ship: *ship,
                            attribute: *attribute,
                        });
                    }
                }
                if let Some(modifier) = added {
                    resolved.add_modifier(*modifier);
                }
            }
            Self::ShipDeath { ship, play_index } => {
                if battle.play_order.get(*play_index) != Some(ship)
                    || battle.is_playing(*ship)
                {
                    return Err(IntegrityError::PlayOrderMismatch {
                        ship: *ship,
                        index: *play_index,
                    });
                }
                ship_mut(battle, *ship)?.alive = false;
                battle.play_order.remove(*play_index);
                if *play_index < battle.playing_index {
                    battle.playing_index -= 1;
                }
            }
            Self::ShipRevive { ship, play_index } => {
                let order_len = battle.play_order.len();
                let target = ship_mut(battle, *ship)?;
                if target.alive || *play_index > order_len {
                    return Err(IntegrityError::PlayOrderMismatch {
                        ship: *ship,
                        index: *play_index,
                    });
                }
                target.alive = true;
                battle.play_order.insert(*play_index, *ship);
                if *play_index <= battle.playing_index && battle.play_order.len() > 1 {
                    battle.playing_index += 1;
                }
            }
            Self::ShipChange {
                ship,
                new_ship,
                cycle_diff,
            } => {
                if !battle.is_playing(*ship) {
                    return Err(IntegrityError::NotPlayingShip { ship: *ship });
                }
                let index = battle
                    .play_order
                    .iter()
                    .position(|id| id == new_ship)
                    .ok_or(IntegrityError::PlayOrderMismatch {
                        ship: *new_ship,
                        index: battle.playing_index,
                    })?;
                battle.cycle = battle
                    .cycle
                    .checked_add_signed(*cycle_diff)
                    .ok_or(IntegrityError::PlayOrderMismatch {
                        ship: *new_ship,
                        index,
                    })?;
                battle.playing_index = index;
            }
            Self::ShipMove { ship, end, .. } => {
                ship_mut(battle, *ship)?.location = *end;
            }
            Self::ShipCooldown {
                ship,
                equipment,
                heat,
                uses,
            } => {
                let mismatch = IntegrityError::CooldownMismatch {
                    ship: *ship,
                    equipment: *equipment,
                };
                let cooldown = &mut equipment_mut(battle, *ship, *equipment)?.cooldown;
                let new_heat = cooldown.heat.checked_add_signed(*heat).ok_or(mismatch.clone())?;
                let new_uses = cooldown.uses.checked_add_signed(*uses).ok_or(mismatch)?;
                cooldown.heat = new_heat;
                cooldown.uses = new_uses;
            }
            Self::ShipActionUsed {
                ship, action, heat, ..
            } => {
                if !battle.is_playing(*ship) {
                    return Err(IntegrityError::NotPlayingShip { ship: *ship });
                }
                if let ActionSource::Equipment(equipment) = action {
                    let cooldown = &mut equipment_mut(battle, *ship, *equipment)?.cooldown;
                    let mut used = *cooldown;
                    if used.use_once() != *heat {
                        return Err(IntegrityError::CooldownMismatch {
                            ship: *ship,
                            equipment: *equipment,
                        });
                    }
                    *cooldown = used;
                }
            }
            Self::ShipActionRewound {
                ship, action, heat, ..
            } => {
                if let ActionSource::Equipment(equipment) = action {
                    let mismatch = IntegrityError::CooldownMismatch {
                        ship: *ship,
                        equipment: *equipment,
                    };
                    let cooldown = &mut equipment_mut(battle, *ship, *equipment)?.cooldown;
                    let new_heat = cooldown.heat.checked_sub(*heat).ok_or(mismatch.clone())?;
                    let new_uses = cooldown.uses.checked_sub(1).ok_or(mismatch)?;
                    cooldown.heat = new_heat;
                    cooldown.uses = new_uses;
                }
            }
            Self::ShipActionToggle {
                ship,
                equipment,
                activated,
                intrusions,
            } => {
                let toggle = &mut equipment_mut(battle, *ship, *equipment)?.toggle;
                let consistent = if *activated {
                    !toggle.activated && toggle.intrusions == 0
                } else {
                    toggle.activated && toggle.intrusions == *intrusions
                };
                if !consistent {
                    return Err(IntegrityError::ToggleMismatch {
                        ship: *ship,
                        equipment: *equipment,
                    });
                }
                toggle.activated = *activated;
                toggle.intrusions = if *activated { *intrusions } else { 0 };
            }
            Self::ShipEffectAdded { ship, effect } => {
                if !ship_mut(battle, *ship)?.insert_effect(effect.clone()) {
                    return Err(IntegrityError::DuplicateEffect {
                        ship: *ship,
                        key: effect.key,
                    });
                }
            }
            Self::ShipEffectRemoved { ship, effect } => {
                ship_mut(battle, *ship)?
                    .remove_effect(&effect.key)
                    .ok_or(IntegrityError::EffectNotFound {
                        ship: *ship,
                        key: effect.key,
                    })?;
            }
            Self::ShipEffectChanged {
                ship,
                before,
                after,
            } => {
                let current = ship_mut(battle, *ship)?
                    .effect_mut(&before.key)
                    .filter(|current| **current == *before && before.key == after.key)
                    .ok_or(IntegrityError::EffectNotFound {
                        ship: *ship,
                        key: before.key,
                    })?;
                *current = after.clone();
            }
            Self::VigilanceTriggered { ship, equipment, .. } => {
                let toggle = &mut equipment_mut(battle, *ship, *equipment)?.toggle;
                if !toggle.activated {
                    return Err(IntegrityError::ToggleMismatch {
                        ship: *ship,
                        equipment: *equipment,
                    });
                }
                toggle.intrusions += 1;
            }
            Self::VigilanceRewound { ship, equipment, .. } => {
                let toggle = &mut equipment_mut(battle, *ship, *equipment)?.toggle;
                if !toggle.activated || toggle.intrusions == 0 {
                    return Err(IntegrityError::ToggleMismatch {
                        ship: *ship,
                        equipment: *equipment,
                    });
                }
                toggle.intrusions -= 1;
            }
            Self::DroneDeployed { drone } => {
                match battle.drones.binary_search_by(|d| d.id.cmp(&drone.id)) {
                    Ok(_) => return Err(IntegrityError::DuplicateDrone(drone.id)),
                    Err(index) => battle.drones.insert(index, drone.clone()),
                }
            }
            Self::DroneDestroyed { drone } => {
                let index = battle
                    .drones
                    .binary_search_by(|d| d.id.cmp(&drone.id))
                    .map_err(|_| IntegrityError::DroneNotFound(drone.id))?;
                battle.drones.remove(index);
            }
            Self::DroneChanged { before, after } => {
                let current = battle
                    .drones
                    .iter_mut()
                    .find(|d| **d == *before && before.id == after.id)
                    .ok_or(IntegrityError::DroneNotFound(before.id))?;
                *current = after.clone();
            }
            Self::BattleEnded { winner, cycle } => {
                battle.status = BattleStatus::Ended;
                battle.outcome = Some(BattleOutcome {
                    winner: *winner,
                    cycle: *cycle,
                });
            }
            Self::BattleResumed { .. } => {
                battle.status = BattleStatus::InProgress;
                battle.outcome = None;
            }
            Self::ShipDamage { .. }
            | Self::ShipActionEnded { .. }
            | Self::ProjectileFired { .. } => {
            }
        }
        Ok(())
    }
}

fn ship_mut(battle: &mut Battle, id: ShipId) -> Result<&mut Ship, IntegrityError> {
    battle.ship_mut(id).ok_or(IntegrityError::ShipNotFound(id))
}

fn equipment_mut(
    battle: &mut Battle,
    ship: ShipId,
    equipment: EquipmentId,
) -> Result<&mut crate::state::Equipment, IntegrityError> {
    ship_mut(battle, ship)?
        .equipment_mut(equipment)
        .ok_or(IntegrityError::EquipmentNotFound { ship, equipment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectKey, EffectKind, EffectSource, ValueEffect};
    use crate::state::{ArenaLocation, DroneId, EquipmentId};
    use crate::testing::{SHIP_A, SHIP_B, started_battle};

    fn assert_reversible(battle: &mut Battle, diff: BattleDiff) {
        let before = battle.clone();
        diff.apply(battle).expect("apply");
        diff.revert(battle).expect("revert");
        assert_eq!(*battle, before, "{} is not reversible", diff.as_ref());
    }

    #[test]
    fn value_diff_round_trip() {
        let mut battle = started_battle();
        assert_reversible(
            &mut battle,
            BattleDiff::ShipValue {
                ship: SHIP_A,
                value: ValueKind::Hull,
                delta: -30,
            },
        );
    }

    #[test]
    fn unknown_ship_is_an_integrity_error() {
        let mut battle = started_battle();
        let diff = BattleDiff::ShipValue {
            ship: ShipId(99),
            value: ValueKind::Hull,
            delta: 1,
        };
        assert_eq!(
            diff.apply(&mut battle),
            Err(IntegrityError::ShipNotFound(ShipId(99)))
        );
    }

    #[test]
    fn status_gates_mutations() {
        let mut battle = started_battle();
        let end = BattleDiff::BattleEnded {
            winner: None,
            cycle: 1,
        };
        end.apply(&mut battle).expect("end");
        let diff = BattleDiff::ShipValue {
            ship: SHIP_A,
            value: ValueKind::Hull,
            delta: 1,
        };
        assert!(matches!(
            diff.apply(&mut battle),
            Err(IntegrityError::BattleNotInProgress { .. })
        ));
        end.revert(&mut battle).expect("resume");
        assert_eq!(battle.status, BattleStatus::InProgress);
        assert_eq!(battle.outcome, None);
    }

    #[test]
    fn attribute_modifier_must_exist_to_be_removed() {
        let mut battle = started_battle();
        let diff = BattleDiff::ShipAttribute {
            ship: SHIP_A,
            attribute: AttributeKind::Precision,
            added: None,
            removed: Some(AttributeModifier::Cumulative(3)),
        };
        assert!(matches!(
            diff.apply(&mut battle),
            Err(IntegrityError::ModifierNotFound { .. })
        ));
        assert_reversible(&mut battle, diff.reverse());
    }

    #[test]
    fn death_and_revive_keep_the_playing_ship() {
        let mut battle = started_battle();
        // play order [A, B]; make B play, then kill A (index 0, before B)
        battle.playing_index = 1;
        let death = BattleDiff::ShipDeath {
            ship: SHIP_A,
            play_index: 0,
        };
        death.apply(&mut battle).expect("death");
        assert_eq!(battle.play_order, vec![SHIP_B]);
        assert_eq!(battle.playing_ship_id(), Some(SHIP_B));
        assert!(!battle.ship(SHIP_A).expect("ship").alive);

        death.revert(&mut battle).expect("revive");
        assert_eq!(battle.play_order, vec![SHIP_A, SHIP_B]);
        assert_eq!(battle.playing_ship_id(), Some(SHIP_B));
    }

    #[test]
    fn revive_past_the_play_order_end_is_rejected() {
        let mut battle = started_battle();
        battle.playing_index = 1;
        BattleDiff::ShipDeath {
            ship: SHIP_A,
            play_index: 0,
        }
        .apply(&mut battle)
        .expect("death");
        let before = battle.clone();

        let revive = BattleDiff::ShipRevive {
            ship: SHIP_A,
            play_index: 2,
        };
        assert_eq!(
            revive.apply(&mut battle),
            Err(IntegrityError::PlayOrderMismatch {
                ship: SHIP_A,
                index: 2,
            })
        );
        assert_eq!(battle, before);

        let at_end = BattleDiff::ShipRevive {
            ship: SHIP_A,
            play_index: 1,
        };
        at_end.apply(&mut battle).expect("revive at the end");
        assert_eq!(battle.play_order, vec![SHIP_B, SHIP_A]);
        assert_eq!(battle.playing_ship_id(), Some(SHIP_B));
    }

    #[test]
    fn playing_ship_cannot_die() {
        let mut battle = started_battle();
        let death = BattleDiff::ShipDeath {
            ship: SHIP_A,
            play_index: 0,
        };
        assert!(matches!(
            death.apply(&mut battle),
            Err(IntegrityError::PlayOrderMismatch { .. })
        ));
    }

    #[test]
    fn ship_change_wraps_cycle() {
        let mut battle = started_battle();
        let to_b = BattleDiff::ShipChange {
            ship: SHIP_A,
            new_ship: SHIP_B,
            cycle_diff: 0,
        };
        to_b.apply(&mut battle).expect("change");
        assert_eq!(battle.playing_ship_id(), Some(SHIP_B));

        let wrap = BattleDiff::ShipChange {
            ship: SHIP_B,
            new_ship: SHIP_A,
            cycle_diff: 1,
        };
        assert_reversible(&mut battle, wrap.clone());
        wrap.apply(&mut battle).expect("wrap");
        assert_eq!(battle.cycle, 2);
        assert_eq!(battle.playing_ship_id(), Some(SHIP_A));

        let stale = BattleDiff::ShipChange {
            ship: SHIP_B,
            new_ship: SHIP_A,
            cycle_diff: 1,
        };
        assert_eq!(
            stale.apply(&mut battle),
            Err(IntegrityError::NotPlayingShip { ship: SHIP_B })
        );
    }

    #[test]
    fn action_used_tracks_cooldown() {
        let mut battle = started_battle();
        let weapon = crate::testing::add_weapon(&mut battle, SHIP_A, 10, 100.0);
        battle
            .ship_mut(SHIP_A)
            .and_then(|ship| ship.equipment_mut(weapon))
            .expect("weapon")
            .cooldown
            .configure(1, 2);

        let used = BattleDiff::ShipActionUsed {
            ship: SHIP_A,
            action: ActionSource::Equipment(weapon),
            target: Target::Ship(SHIP_B),
            heat: 2,
        };
        assert_reversible(&mut battle, used.clone());

        let wrong = BattleDiff::ShipActionUsed {
            ship: SHIP_A,
            action: ActionSource::Equipment(weapon),
            target: Target::Ship(SHIP_B),
            heat: 0,
        };
        let before = battle.clone();
        assert!(matches!(
            wrong.apply(&mut battle),
            Err(IntegrityError::CooldownMismatch { .. })
        ));
        assert_eq!(battle, before);
    }

    #[test]
    fn toggle_and_vigilance_counters() {
        let mut battle = started_battle();
        let equipment = EquipmentId(50);
        battle
            .ship_mut(SHIP_A)
            .expect("ship")
            .equipment
            .push(crate::state::Equipment::new(
                equipment,
                "watch",
                crate::state::SlotKind::Shield,
            ));

        let on = BattleDiff::ShipActionToggle {
            ship: SHIP_A,
            equipment,
            activated: true,
            intrusions: 0,
        };
        assert_reversible(&mut battle, on.clone());
        on.apply(&mut battle).expect("on");

        let triggered = BattleDiff::VigilanceTriggered {
            ship: SHIP_A,
            equipment,
            intruder: SHIP_B,
        };
        triggered.apply(&mut battle).expect("triggered");
        let off = BattleDiff::ShipActionToggle {
            ship: SHIP_A,
            equipment,
            activated: false,
            intrusions: 1,
        };
        assert_reversible(&mut battle, off.clone());
        off.apply(&mut battle).expect("off");

        let toggle = battle
            .ship(SHIP_A)
            .and_then(|ship| ship.equipment(equipment))
            .expect("equipment")
            .toggle;
        assert!(!toggle.activated);
        assert_eq!(toggle.intrusions, 0);

        off.revert(&mut battle).expect("revert off");
        triggered.revert(&mut battle).expect("revert triggered");
        assert_reversible(&mut battle, on.reverse());
    }

    #[test]
    fn effect_diffs_are_keyed() {
        let mut battle = started_battle();
        let effect = ActiveEffect {
            key: EffectKey::Sticky {
                source: EffectSource::Drone(DroneId(1)),
                index: 0,
            },
            effect: EffectKind::Value(ValueEffect::on_turn_start(ValueKind::Shield, 5)),
            remaining: Some(2),
        };
        let added = BattleDiff::ShipEffectAdded {
            ship: SHIP_A,
            effect: effect.clone(),
        };
        assert_reversible(&mut battle, added.clone());
        added.apply(&mut battle).expect("add");
        assert!(matches!(
            added.apply(&mut battle),
            Err(IntegrityError::DuplicateEffect { .. })
        ));

        let changed = BattleDiff::ShipEffectChanged {
            ship: SHIP_A,
            before: effect.clone(),
            after: ActiveEffect {
                remaining: Some(1),
                ..effect.clone()
            },
        };
        assert_reversible(&mut battle, changed.clone());
        changed.apply(&mut battle).expect("change");
        assert!(matches!(
            changed.apply(&mut battle),
            Err(IntegrityError::EffectNotFound { .. })
        ));
    }

    #[test]
    fn drone_diffs_keep_drones_sorted() {
        let mut battle = started_battle();
        let drone = |id: u32| Drone {
            id: DroneId(id),
            owner: SHIP_A,
            equipment: EquipmentId(1),
            code: "scout".to_owned(),
            location: ArenaLocation::new(200.0, 200.0),
            radius: 50.0,
            remaining: 2,
            filter: crate::action::ActionFilter::All,
            effects: Vec::new(),
        };
        BattleDiff::DroneDeployed { drone: drone(3) }
            .apply(&mut battle)
            .expect("deploy 3");
        BattleDiff::DroneDeployed { drone: drone(1) }
            .apply(&mut battle)
            .expect("deploy 1");
        let ids: Vec<_> = battle.drones.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(battle.next_drone_id(), DroneId(4));

        let changed = BattleDiff::DroneChanged {
            before: drone(3),
            after: Drone {
                remaining: 1,
                ..drone(3)
            },
        };
        assert_reversible(&mut battle, changed);
        assert_reversible(&mut battle, BattleDiff::DroneDestroyed { drone: drone(1) });
    }
}
