use crate::diff::BattleDiff;
use crate::effect::EffectKind;
use crate::state::{ArenaLocation, ArenaLocationAngle, ShipId, Target, angular_difference};

use super::{
    ActionContext, ActionFilter, ActionRejection, ActionTransition, ResolutionStep, effect_steps,
};

/// Fire a weapon or trigger a device, applying effects on impacted ships.
///
/// - `range == 0`: self-triggered, on the ship itself
/// - `blast > 0`: every ship within `blast` of the (range-constrained) target
/// - `angle > 0`: every ship within `range` in an arc of `angle` degrees
/// - otherwise: the single targeted ship, which must be in range
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerAction {
    pub power: i64,
    pub range: f64,
    pub blast: f64,
    /// Arc width in degrees.
    pub angle: f64,
    pub filter: ActionFilter,
    pub effects: Vec<EffectKind>,
}

impl TriggerAction {
    pub fn new(power: i64, range: f64) -> Self {
        Self {
            power,
            range,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_blast(mut self, blast: f64) -> Self {
        self.blast = blast;
        self
    }

    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: ActionFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<EffectKind>) -> Self {
        self.effects.push(effect.into());
        self
    }

    fn is_area(&self) -> bool {
        self.blast > 0.0 || self.angle > 0.0
    }

    /// Ships hit when firing from `source` on `target`.
    pub fn impacted_ships(
        &self,
        ctx: &ActionContext<'_>,
        source: ArenaLocation,
        target: &Target,
    ) -> Vec<ShipId> {
        let Some(aim) = target.resolve(ctx.battle) else {
            return Vec::new();
        };
        let owner = ctx.ship.fleet;
        ctx.battle
            .iter_alive_ships()
            .filter(|ship| self.filter.accepts(owner, ship.fleet))
            .filter(|ship| {
                let location = ship.location.location();
                if self.blast > 0.0 {
                    location.distance_to(&aim) <= self.blast
                } else if self.angle > 0.0 {
                    let distance = source.distance_to(&location);
                    let half_arc = (self.angle * 0.5).to_radians();
                    distance >= 1e-6
                        && distance <= self.range
                        && angular_difference(source.angle_to(&location), source.angle_to(&aim))
                            .abs()
                            < half_arc
                } else {
                    target.ship_id() == Some(ship.id)
                }
            })
            .map(|ship| ship.id)
            .collect()
    }

    /// Returns true if at least one effect harms its receiver.
    pub fn is_harmful(&self) -> bool {
        self.effects.iter().any(|effect| !effect.is_beneficial())
    }
}

impl ActionTransition for TriggerAction {
    fn minimal_cost(&self, _ctx: &ActionContext<'_>) -> i64 {
        self.power
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        let origin = ctx.ship.location.location();
        match target {
            Target::Ship(id) => {
                if self.range > 0.0 && id == ctx.ship.id {
                    return Err(ActionRejection::SelfTarget);
                }
                let ship = ctx
                    .battle
                    .ship(id)
                    .filter(|ship| ship.alive)
                    .ok_or(ActionRejection::InvalidTarget)?;
                let location = ship.location.location();
                if self.is_area() {
                    Ok(Target::Location(location.constrained_in_range(&origin, self.range)))
                } else if location.distance_to(&origin) <= self.range {
                    Ok(target)
                } else {
                    Err(ActionRejection::OutOfRange)
                }
            }
            Target::Location(location) if self.is_area() => {
                Ok(Target::Location(location.constrained_in_range(&origin, self.range)))
            }
            Target::Location(_) => Err(ActionRejection::InvalidTarget),
        }
    }

    fn cost(&self, _ctx: &ActionContext<'_>, _target: &Target) -> i64 {
        self.power
    }

    fn resolution(&self, ctx: &ActionContext<'_>, target: &Target) -> Vec<ResolutionStep> {
        let (Some(equipment), Some(source)) = (ctx.equipment, ctx.effect_source()) else {
            return Vec::new();
        };
        let Some(aim) = target.resolve(ctx.battle) else {
            return Vec::new();
        };
        let start = ctx.ship.location;
        let origin = start.location();

        let mut steps = Vec::new();
        if origin.distance_to(&aim) > 1e-6 {
            let angle = origin.angle_to(&aim);
            if angular_difference(angle, start.angle).abs() > 1e-6 {
                steps.push(
                    BattleDiff::ShipMove {
                        ship: ctx.ship.id,
                        start,
                        end: ArenaLocationAngle::new(start.x, start.y, angle),
                    }
                    .into(),
                );
            }
            if self.range > 0.0 {
                steps.push(
                    BattleDiff::ProjectileFired {
                        ship: ctx.ship.id,
                        equipment: equipment.id,
                        target: *target,
                    }
                    .into(),
                );
            }
        }

        let impacted = self.impacted_ships(ctx, origin, target);
        steps.extend(effect_steps(&self.effects, &impacted, source));
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DamageEffect;
    use crate::state::Battle;
    use crate::testing::{SHIP_A, SHIP_B, add_ship, add_trigger, started_battle};

    fn check(
        battle: &Battle,
        weapon: crate::state::EquipmentId,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        let ship = battle.ship(SHIP_A).expect("ship");
        let equipment = ship.equipment(weapon).expect("weapon");
        let Some(crate::action::ActionKind::Trigger(trigger)) = &equipment.action else {
            panic!("trigger expected");
        };
        trigger.check_target(&ActionContext::new(battle, ship, Some(equipment)), target)
    }

    #[test]
    fn single_target_must_be_in_range() {
        let mut battle = started_battle();
        // ships A (100,100) and B (500,100)
        let short = add_trigger(&mut battle, SHIP_A, TriggerAction::new(1, 100.0));
        let long = add_trigger(&mut battle, SHIP_A, TriggerAction::new(1, 500.0));
        assert_eq!(
            check(&battle, short, Target::Ship(SHIP_B)),
            Err(ActionRejection::OutOfRange)
        );
        assert_eq!(
            check(&battle, long, Target::Ship(SHIP_B)),
            Ok(Target::Ship(SHIP_B))
        );
        assert_eq!(
            check(&battle, long, Target::Ship(SHIP_A)),
            Err(ActionRejection::SelfTarget)
        );
        assert_eq!(
            check(&battle, long, Target::location(300.0, 100.0)),
            Err(ActionRejection::InvalidTarget)
        );
    }

    #[test]
    fn blast_target_is_constrained() {
        let mut battle = started_battle();
        let weapon = add_trigger(
            &mut battle,
            SHIP_A,
            TriggerAction::new(1, 100.0).with_blast(50.0),
        );
        assert_eq!(
            check(&battle, weapon, Target::Ship(SHIP_B)),
            Ok(Target::location(200.0, 100.0))
        );
    }

    #[test]
    fn self_trigger_allowed_without_range() {
        let mut battle = started_battle();
        let device = add_trigger(&mut battle, SHIP_A, TriggerAction::new(1, 0.0));
        assert_eq!(
            check(&battle, device, Target::Ship(SHIP_A)),
            Ok(Target::Ship(SHIP_A))
        );
    }

    #[test]
    fn impacted_ships_by_shape() {
        let mut battle = Battle::default();
        crate::testing::add_fleets(&mut battle);
        add_ship(&mut battle, SHIP_A, 1, 0.0, 0.0);
        add_ship(&mut battle, crate::state::ShipId(3), 2, 20.0, 0.0);
        add_ship(&mut battle, crate::state::ShipId(4), 2, 0.0, 20.0);
        add_ship(&mut battle, crate::state::ShipId(5), 2, 50.0, 0.0);
        crate::testing::start_in_fleet_order(&mut battle);

        let ship = battle.ship(SHIP_A).expect("ship");
        let ctx = ActionContext::new(&battle, ship, None);
        let origin = ArenaLocation::new(0.0, 0.0);
        let ids = |ids: &[u32]| ids.iter().map(|id| ShipId(*id)).collect::<Vec<_>>();

        let blast = TriggerAction::new(1, 100.0).with_blast(25.0);
        assert_eq!(
            blast.impacted_ships(&ctx, origin, &Target::location(5.0, 0.0)),
            ids(&[1, 3, 4])
        );

        let cone = TriggerAction::new(1, 60.0).with_angle(90.0);
        assert_eq!(
            cone.impacted_ships(&ctx, origin, &Target::location(30.0, 0.0)),
            ids(&[3, 5])
        );

        let enemies = TriggerAction::new(1, 100.0)
            .with_blast(25.0)
            .with_filter(ActionFilter::Enemies);
        assert_eq!(
            enemies.impacted_ships(&ctx, origin, &Target::location(5.0, 0.0)),
            ids(&[3, 4])
        );

        let single = TriggerAction::new(1, 60.0).with_effect(DamageEffect::new(5, 0));
        assert_eq!(
            single.impacted_ships(&ctx, origin, &Target::Ship(ShipId(5))),
            ids(&[5])
        );
        assert!(single.is_harmful());
    }
}
