use crate::diff::BattleDiff;
use crate::state::{ArenaLocation, ArenaLocationAngle, ExclusionAreas, Ship};

use super::EffectContext;

/// Prevent a ship from using its engine; a hard pin also prevents any
/// displacement by other effects.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinnedEffect {
    pub hard: bool,
}

impl PinnedEffect {
    pub fn new(hard: bool) -> Self {
        Self { hard }
    }

    pub fn description(&self) -> &'static str {
        if self.hard { "anchored" } else { "pinned" }
    }
}

/// Push ships away from the source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepelEffect {
    pub distance: f64,
}

impl RepelEffect {
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }

    pub(super) fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        if ctx.source.ship() == Some(target.id) || target.pinned() == Some(true) {
            return Vec::new();
        }
        let Some(origin) = ctx.source_location() else {
            return Vec::new();
        };

        let start = target.location.location();
        let angle = origin.angle_to(&start);
        let wanted = ArenaLocation::new(
            start.x + angle.cos() * self.distance,
            start.y + angle.sin() * self.distance,
        );
        let exclusion = ExclusionAreas::from_battle(ctx.battle, &[target.id], 0.0);
        let destination = exclusion.stop_before(wanted, start);
        if destination.distance_to(&start) < 1e-6 {
            return Vec::new();
        }

        vec![BattleDiff::ShipMove {
            ship: target.id,
            start: target.location,
            end: ArenaLocationAngle::new(destination.x, destination.y, target.location.angle),
        }]
    }
}
