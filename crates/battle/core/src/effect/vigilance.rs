use tracing::debug;

use crate::action::ActionKind;
use crate::diff::BattleDiff;
use crate::state::Ship;

use super::{EffectContext, EffectSource};

/// Marker registered by a vigilance toggle on ships inside its area.
///
/// The watching ship and equipment come from the effect source. When the
/// playing ship enters the area, the watcher reacts with its intruder effects.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VigilanceEffect {}

impl VigilanceEffect {
    pub fn new() -> Self {
        Self {}
    }

    pub(super) fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        let EffectSource::Equipment {
            ship: watcher,
            equipment,
        } = ctx.source
        else {
            return Vec::new();
        };
        let battle = ctx.battle;
        if watcher == target.id || !battle.is_playing(target.id) {
            return Vec::new();
        }
        let Some(mounted) = battle.ship(watcher).and_then(|ship| ship.equipment(equipment)) else {
            return Vec::new();
        };
        let Some(ActionKind::Vigilance(vigilance)) = &mounted.action else {
            return Vec::new();
        };

        debug!(
            target: "battle::effect",
            watcher = %watcher,
            intruder = %target.id,
            "vigilance triggered"
        );

        let mut diffs = vec![BattleDiff::VigilanceTriggered {
            ship: watcher,
            equipment,
            intruder: target.id,
        }];

        let index = ctx.index;
        for (position, effect) in vigilance.intruder_effects.iter().enumerate() {
            ctx.index = position as u16;
            diffs.extend(effect.on_diffs(ctx, target));
        }
        ctx.index = index;

        let intrusions = mounted.toggle.intrusions + 1;
        if vigilance.intruder_count > 0 && intrusions >= vigilance.intruder_count {
            diffs.push(BattleDiff::ShipActionToggle {
                ship: watcher,
                equipment,
                activated: false,
                intrusions,
            });
        }
        diffs
    }
}
