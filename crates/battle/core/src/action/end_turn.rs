use crate::diff::BattleDiff;
use crate::state::{Battle, Ship, Target, ValueKind};

use super::{ActionContext, ActionRejection, ActionTransition, ResolutionStep};

/// End the playing ship's turn.
///
/// Power is recovered up to capacity minus the power reserved by activated
/// toggles, equipment cools down, sticky effects and owned drones age, and
/// the next ship in play order takes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EndTurnAction;

impl EndTurnAction {
    fn cooling_diffs(ship: &Ship) -> impl Iterator<Item = BattleDiff> + '_ {
        ship.equipment.iter().filter_map(|equipment| {
            let (heat, uses) = equipment.cooldown.cooling_step();
            (heat > 0 || uses > 0).then(|| BattleDiff::ShipCooldown {
                ship: ship.id,
                equipment: equipment.id,
                heat: -(heat as i32),
                uses: -(uses as i32),
            })
        })
    }

    fn drone_diffs<'b>(battle: &'b Battle, ship: &Ship) -> impl Iterator<Item = BattleDiff> + 'b {
        battle.drones_of(ship.id).map(|drone| {
            if drone.remaining <= 1 {
                BattleDiff::DroneDestroyed {
                    drone: drone.clone(),
                }
            } else {
                let mut after = drone.clone();
                after.remaining -= 1;
                BattleDiff::DroneChanged {
                    before: drone.clone(),
                    after,
                }
            }
        })
    }
}

impl ActionTransition for EndTurnAction {
    fn minimal_cost(&self, _ctx: &ActionContext<'_>) -> i64 {
        i64::MIN
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        _target: Target,
    ) -> Result<Target, ActionRejection> {
        Ok(Target::Ship(ctx.ship.id))
    }

    /// Negative: the power recovered.
    fn cost(&self, ctx: &ActionContext<'_>, _target: &Target) -> i64 {
        let ship = ctx.ship;
        ship.value(ValueKind::Power) + ship.toggled_power() - ship.capacity(ValueKind::Power)
    }

    fn resolution(&self, ctx: &ActionContext<'_>, _target: &Target) -> Vec<ResolutionStep> {
        let battle = ctx.battle;
        let ship = ctx.ship;

        let mut diffs: Vec<BattleDiff> = Self::cooling_diffs(ship).collect();
        for effect in &ship.active_effects {
            diffs.extend(effect.turn_end_diffs(ship));
        }
        diffs.extend(Self::drone_diffs(battle, ship));

        if !battle.play_order.is_empty() {
            let next_index = (battle.playing_index + 1) % battle.play_order.len();
            if let Some(next) = battle
                .play_order
                .get(next_index)
                .and_then(|id| battle.ship(*id))
            {
                diffs.push(BattleDiff::ShipChange {
                    ship: ship.id,
                    new_ship: next.id,
                    cycle_diff: i32::from(next_index == 0),
                });
                for effect in &next.active_effects {
                    diffs.extend(effect.turn_start_diffs(next));
                }
            }
        }

        diffs.into_iter().map(ResolutionStep::Diff).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{ActiveEffect, EffectKey, EffectKind, EffectSource, ValueEffect};
    use crate::state::{ArenaLocation, Drone, DroneId};
    use crate::testing::{SHIP_A, SHIP_B, add_weapon, started_battle};

    fn resolve(battle: &Battle) -> (i64, Vec<BattleDiff>) {
        let ship = battle.ship(SHIP_A).expect("ship");
        let ctx = ActionContext::new(battle, ship, None);
        let target = Target::Ship(SHIP_A);
        let diffs = EndTurnAction
            .resolution(&ctx, &target)
            .into_iter()
            .map(|step| match step {
                ResolutionStep::Diff(diff) => diff,
                ResolutionStep::Effect { .. } => panic!("end turn resolves to diffs"),
            })
            .collect();
        (EndTurnAction.cost(&ctx, &target), diffs)
    }

    #[test]
    fn hands_over_to_next_ship() {
        let mut battle = started_battle();
        battle.ship_mut(SHIP_A).expect("ship").values.power = 4;
        let (cost, diffs) = resolve(&battle);
        // capacity 10, 4 left: 6 recovered
        assert_eq!(cost, -6);
        assert_eq!(
            diffs,
            vec![BattleDiff::ShipChange {
                ship: SHIP_A,
                new_ship: SHIP_B,
                cycle_diff: 0,
            }]
        );
    }

    #[test]
    fn cools_equipment_and_ages_drones() {
        let mut battle = started_battle();
        let weapon = add_weapon(&mut battle, SHIP_A, 10, 100.0);
        {
            let ship = battle.ship_mut(SHIP_A).expect("ship");
            let cooldown = &mut ship.equipment_mut(weapon).expect("weapon").cooldown;
            cooldown.uses = 2;
            cooldown.heat = 1;
        }
        let drone = Drone {
            id: DroneId(1),
            owner: SHIP_A,
            equipment: weapon,
            code: "drone".to_owned(),
            location: ArenaLocation::new(300.0, 300.0),
            radius: 50.0,
            remaining: 2,
            filter: Default::default(),
            effects: Vec::new(),
        };
        battle.drones.push(drone.clone());
        battle
            .ship_mut(SHIP_B)
            .expect("ship")
            .insert_effect(ActiveEffect {
                key: EffectKey::Sticky {
                    source: EffectSource::Drone(DroneId(7)),
                    index: 0,
                },
                effect: EffectKind::Value(ValueEffect::on_turn_start(ValueKind::Hull, -5)),
                remaining: Some(2),
            });

        let (_, diffs) = resolve(&battle);
        assert_eq!(
            diffs[0],
            BattleDiff::ShipCooldown {
                ship: SHIP_A,
                equipment: weapon,
                heat: -1,
                uses: -2,
            }
        );
        let BattleDiff::DroneChanged { after, .. } = &diffs[1] else {
            panic!("drone aging expected");
        };
        assert_eq!(after.remaining, 1);
        assert!(matches!(diffs[2], BattleDiff::ShipChange { .. }));
        assert_eq!(
            diffs[3],
            BattleDiff::ShipValue {
                ship: SHIP_B,
                value: ValueKind::Hull,
                delta: -5,
            }
        );
        assert!(matches!(diffs[4], BattleDiff::ShipEffectChanged { .. }));
    }

    #[test]
    fn last_ship_wraps_the_cycle() {
        let mut battle = started_battle();
        battle.playing_index = 1;
        let ship = battle.ship(SHIP_B).expect("ship");
        let ctx = ActionContext::new(&battle, ship, None);
        let steps = EndTurnAction.resolution(&ctx, &Target::Ship(SHIP_B));
        assert_eq!(
            steps,
            vec![ResolutionStep::Diff(BattleDiff::ShipChange {
                ship: SHIP_B,
                new_ship: SHIP_A,
                cycle_diff: 1,
            })]
        );
    }
}
