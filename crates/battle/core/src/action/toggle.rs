use crate::diff::BattleDiff;
use crate::effect::{EffectKind, VigilanceEffect};
use crate::state::Target;

use super::{ActionContext, ActionFilter, ActionRejection, ActionTransition, ResolutionStep};

/// Switchable action projecting area effects around the ship.
///
/// While activated, `power` stays reserved: it is not recovered at turn end
/// and is given back when the toggle is switched off. The area effects
/// themselves are maintained by the post-action checks.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToggleAction {
    pub power: i64,
    pub radius: f64,
    pub filter: ActionFilter,
    pub effects: Vec<EffectKind>,
}

impl ToggleAction {
    pub fn new(power: i64, radius: f64) -> Self {
        Self {
            power,
            radius,
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

    fn is_activated(ctx: &ActionContext<'_>) -> bool {
        ctx.equipment.is_some_and(|equipment| equipment.toggle.activated)
    }
}

impl ActionTransition for ToggleAction {
    fn minimal_cost(&self, ctx: &ActionContext<'_>) -> i64 {
        if Self::is_activated(ctx) { 0 } else { self.power }
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        if target == Target::Ship(ctx.ship.id) {
            Ok(target)
        } else {
            Err(ActionRejection::InvalidTarget)
        }
    }

    fn cost(&self, ctx: &ActionContext<'_>, _target: &Target) -> i64 {
        if Self::is_activated(ctx) {
            -self.power
        } else {
            self.power
        }
    }

    fn resolution(&self, ctx: &ActionContext<'_>, _target: &Target) -> Vec<ResolutionStep> {
        let Some(equipment) = ctx.equipment else {
            return Vec::new();
        };
        let state = equipment.toggle;
        vec![
            BattleDiff::ShipActionToggle {
                ship: ctx.ship.id,
                equipment: equipment.id,
                activated: !state.activated,
                intrusions: if state.activated { state.intrusions } else { 0 },
            }
            .into(),
        ]
    }
}

/// Toggle watching its area: each ship starting to play inside it suffers
/// the intruder effects.
///
/// With a nonzero `intruder_count`, the toggle switches itself off after
/// that many intrusions. A ship with an active vigilance cannot move.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VigilanceAction {
    pub toggle: ToggleAction,
    pub intruder_count: u32,
    pub intruder_effects: Vec<EffectKind>,
}

impl VigilanceAction {
    /// Wraps `toggle`, replacing its area effects by the vigilance marker.
    pub fn new(
        mut toggle: ToggleAction,
        intruder_count: u32,
        intruder_effects: Vec<EffectKind>,
    ) -> Self {
        toggle.effects = vec![VigilanceEffect::new().into()];
        Self {
            toggle,
            intruder_count,
            intruder_effects,
        }
    }
}

impl ActionTransition for VigilanceAction {
    fn minimal_cost(&self, ctx: &ActionContext<'_>) -> i64 {
        self.toggle.minimal_cost(ctx)
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        self.toggle.check_target(ctx, target)
    }

    fn cost(&self, ctx: &ActionContext<'_>, target: &Target) -> i64 {
        self.toggle.cost(ctx, target)
    }

    fn resolution(&self, ctx: &ActionContext<'_>, target: &Target) -> Vec<ResolutionStep> {
        self.toggle.resolution(ctx, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DamageEffect;
    use crate::state::{Battle, EquipmentId};
    use crate::testing::{SHIP_A, SHIP_B, add_action, started_battle};

    fn steps(battle: &Battle, equipment: EquipmentId) -> (i64, i64, Vec<ResolutionStep>) {
        let ship = battle.ship(SHIP_A).expect("ship");
        let mounted = ship.equipment(equipment).expect("equipment");
        let ctx = ActionContext::new(battle, ship, Some(mounted));
        let transition = mounted.action.as_ref().expect("action").transition();
        let target = Target::Ship(SHIP_A);
        (
            transition.minimal_cost(&ctx),
            transition.cost(&ctx, &target),
            transition.resolution(&ctx, &target),
        )
    }

    #[test]
    fn switching_on_and_off() {
        let mut battle = started_battle();
        let shield = add_action(&mut battle, SHIP_A, ToggleAction::new(3, 200.0));

        let (minimal, cost, on) = steps(&battle, shield);
        assert_eq!((minimal, cost), (3, 3));
        let expected_on = BattleDiff::ShipActionToggle {
            ship: SHIP_A,
            equipment: shield,
            activated: true,
            intrusions: 0,
        };
        assert_eq!(on, vec![ResolutionStep::Diff(expected_on.clone())]);
        expected_on.apply(&mut battle).expect("toggle on");

        let (minimal, cost, off) = steps(&battle, shield);
        assert_eq!((minimal, cost), (0, -3));
        assert_eq!(
            off,
            vec![ResolutionStep::Diff(BattleDiff::ShipActionToggle {
                ship: SHIP_A,
                equipment: shield,
                activated: false,
                intrusions: 0,
            })]
        );
    }

    #[test]
    fn toggle_targets_its_own_ship() {
        let mut battle = started_battle();
        let shield = add_action(&mut battle, SHIP_A, ToggleAction::new(3, 200.0));
        let ship = battle.ship(SHIP_A).expect("ship");
        let ctx = ActionContext::new(&battle, ship, ship.equipment(shield));
        let toggle = ToggleAction::new(3, 200.0);
        assert_eq!(
            toggle.check_target(&ctx, Target::Ship(SHIP_B)),
            Err(ActionRejection::InvalidTarget)
        );
        assert_eq!(
            toggle.check_target(&ctx, Target::location(1.0, 1.0)),
            Err(ActionRejection::InvalidTarget)
        );
    }

    #[test]
    fn vigilance_projects_its_marker() {
        let vigilance = VigilanceAction::new(
            ToggleAction::new(2, 150.0).with_effect(DamageEffect::new(1, 0)),
            2,
            vec![DamageEffect::new(10, 0).into()],
        );
        assert_eq!(vigilance.toggle.effects, vec![EffectKind::Vigilance(VigilanceEffect::new())]);
        assert_eq!(vigilance.intruder_effects.len(), 1);
    }
}
