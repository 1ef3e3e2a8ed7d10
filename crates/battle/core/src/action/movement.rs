use crate::diff::BattleDiff;
use crate::state::{ArenaLocationAngle, ExclusionAreas, Target, ValueKind};

use super::{ActionContext, ActionRejection, ActionTransition, ResolutionStep};

/// Engine action: move the ship to a location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    /// Distance covered per power point.
    pub distance_per_power: f64,
    /// Distance kept from other ships, on top of the ship separation.
    pub safety_distance: f64,
}

impl Default for MoveAction {
    fn default() -> Self {
        Self {
            distance_per_power: 0.0,
            safety_distance: Self::DEFAULT_SAFETY_DISTANCE,
        }
    }
}

impl MoveAction {
    pub const DEFAULT_SAFETY_DISTANCE: f64 = 120.0;
    const RANGE_MARGIN: f64 = 0.1;

    pub fn new(distance_per_power: f64) -> Self {
        Self {
            distance_per_power,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_safety_distance(mut self, safety_distance: f64) -> Self {
        self.safety_distance = safety_distance;
        self
    }

    /// Distance reachable with `power` points.
    pub fn range_for_power(&self, power: i64) -> f64 {
        power as f64 * self.distance_per_power
    }
}

impl ActionTransition for MoveAction {
    fn check_availability(&self, ctx: &ActionContext<'_>) -> Result<(), ActionRejection> {
        if ctx.ship.pinned().is_some() {
            return Err(ActionRejection::Pinned);
        }
        if ctx.ship.value(ValueKind::Power) <= 0 {
            return Err(ActionRejection::NotEnoughPower {
                required: 1,
                available: ctx.ship.value(ValueKind::Power),
            });
        }
        if ctx.ship.has_active_vigilance() {
            return Err(ActionRejection::Vigilance);
        }
        Ok(())
    }

    fn minimal_cost(&self, _ctx: &ActionContext<'_>) -> i64 {
        0
    }

    fn check_target(
        &self,
        ctx: &ActionContext<'_>,
        target: Target,
    ) -> Result<Target, ActionRejection> {
        let Target::Location(requested) = target else {
            return Err(ActionRejection::InvalidTarget);
        };
        let origin = ctx.ship.location.location();
        let reachable = (self.range_for_power(ctx.ship.value(ValueKind::Power))
            - Self::RANGE_MARGIN)
            .max(0.0);
        let in_range = requested.constrained_in_range(&origin, reachable);
        let exclusion =
            ExclusionAreas::from_battle(ctx.battle, &[ctx.ship.id], self.safety_distance);
        let destination = exclusion.stop_before(in_range, origin);
        if destination.distance_to(&origin) > 0.0 {
            Ok(Target::Location(destination))
        } else {
            Err(ActionRejection::NoMovement)
        }
    }

    fn cost(&self, ctx: &ActionContext<'_>, target: &Target) -> i64 {
        if self.distance_per_power <= 0.0 {
            return i64::MAX;
        }
        target.resolve(ctx.battle).map_or(0, |destination| {
            let distance = ctx.ship.location.location().distance_to(&destination);
            (distance / self.distance_per_power).ceil() as i64
        })
    }

    fn resolution(&self, ctx: &ActionContext<'_>, target: &Target) -> Vec<ResolutionStep> {
        let Some(destination) = target.resolve(ctx.battle) else {
            return Vec::new();
        };
        let start = ctx.ship.location;
        let origin = start.location();
        let angle = if origin.distance_to(&destination) < 1e-5 {
            start.angle
        } else {
            origin.angle_to(&destination)
        };
        vec![
            BattleDiff::ShipMove {
                ship: ctx.ship.id,
                start,
                end: ArenaLocationAngle::new(destination.x, destination.y, angle),
            }
            .into(),
        ]
    }
}
