use crate::diff::BattleDiff;
use crate::effect::EffectKind;
use crate::state::{Drone, Target};

use super::{ActionContext, ActionFilter, ActionRejection, ActionTransition, ResolutionStep};

/// Deploy a drone applying area effects for a number of owner turns.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeployDroneAction {
    pub power: i64,
    /// Maximal distance between the ship and the drone.
    pub deploy_distance: f64,
    pub effect_radius: f64,
    /// Owner turns the drone lasts.
    pub lifetime: u32,
    pub filter: ActionFilter,
    pub effects: Vec<EffectKind>,
}

impl DeployDroneAction {
    pub fn new(power: i64, deploy_distance: f64, effect_radius: f64, lifetime: u32) -> Self {
        Self {
            power,
            deploy_distance,
            effect_radius,
            lifetime,
            ..Self::default()
        }
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
}

impl ActionTransition for DeployDroneAction {
    fn minimal_cost(&self, _ctx: &ActionContext<'_>) -> i64 {
        self.power
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        let requested = target
            .resolve(ctx.battle)
            .ok_or(ActionRejection::InvalidTarget)?;
        let location =
            requested.constrained_in_range(&ctx.ship.location.location(), self.deploy_distance);
        let crowded = ctx
            .battle
            .drones
            .iter()
            .any(|drone| drone.location.distance_to(&location) < self.effect_radius);
        if crowded {
            Err(ActionRejection::InvalidTarget)
        } else {
            Ok(Target::Location(location))
        }
    }

    fn cost(&self, _ctx: &ActionContext<'_>, _target: &Target) -> i64 {
        self.power
    }

    fn resolution(&self, ctx: &ActionContext<'_>, target: &Target) -> Vec<ResolutionStep> {
        let (Some(equipment), Some(location)) = (ctx.equipment, target.resolve(ctx.battle)) else {
            return Vec::new();
        };
        let drone = Drone {
            id: ctx.battle.next_drone_id(),
            owner: ctx.ship.id,
            equipment: equipment.id,
            code: equipment.code.clone(),
            location,
            radius: self.effect_radius,
            remaining: self.lifetime,
            filter: self.filter,
            effects: self.effects.clone(),
        };
        vec![BattleDiff::DroneDeployed { drone }.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DamageEffect;
    use crate::state::{ArenaLocation, DroneId};
    use crate::testing::{SHIP_A, add_action, started_battle};

    #[test]
    fn deploys_within_distance() {
        let mut battle = started_battle();
        let bay = add_action(
            &mut battle,
            SHIP_A,
            DeployDroneAction::new(2, 100.0, 50.0, 3).with_effect(DamageEffect::new(5, 0)),
        );
        let ship = battle.ship(SHIP_A).expect("ship");
        let equipment = ship.equipment(bay).expect("bay");
        let ctx = ActionContext::new(&battle, ship, Some(equipment));
        let Some(crate::action::ActionKind::DeployDrone(action)) = &equipment.action else {
            panic!("drone action expected");
        };

        // ship A at (100, 100)
        let target = action
            .check_target(&ctx, Target::location(400.0, 100.0))
            .expect("target");
        assert_eq!(target, Target::location(200.0, 100.0));

        let steps = action.resolution(&ctx, &target);
        let [ResolutionStep::Diff(BattleDiff::DroneDeployed { drone })] = steps.as_slice() else {
            panic!("drone deployment expected");
        };
        assert_eq!(drone.id, DroneId(1));
        assert_eq!(drone.owner, SHIP_A);
        assert_eq!(drone.location, ArenaLocation::new(200.0, 100.0));
        assert_eq!(drone.remaining, 3);
        assert_eq!(drone.effects.len(), 1);
    }

    #[test]
    fn drones_cannot_overlap() {
        let mut battle = started_battle();
        let bay = add_action(&mut battle, SHIP_A, DeployDroneAction::new(2, 100.0, 50.0, 3));
        let ship = battle.ship(SHIP_A).expect("ship");
        let equipment = ship.equipment(bay).expect("bay");
        let ctx = ActionContext::new(&battle, ship, Some(equipment));
        let action = DeployDroneAction::new(2, 100.0, 50.0, 3);
        let target = action
            .check_target(&ctx, Target::location(150.0, 100.0))
            .expect("target");
        let steps = action.resolution(&ctx, &target);
        let Some(ResolutionStep::Diff(diff)) = steps.first() else {
            panic!("diff expected");
        };
        diff.apply(&mut battle).expect("deploy");

        let ship = battle.ship(SHIP_A).expect("ship");
        let ctx = ActionContext::new(&battle, ship, ship.equipment(bay));
        assert_eq!(
            action.check_target(&ctx, Target::location(180.0, 100.0)),
            Err(ActionRejection::InvalidTarget)
        );
        assert_eq!(
            action.check_target(&ctx, Target::location(100.0, 150.0)),
            Ok(Target::location(100.0, 150.0))
        );
    }
}
