use crate::diff::BattleDiff;
use crate::state::Ship;

use super::{ActiveEffect, EffectContext, EffectKey, EffectKind};

/// Wrapper sticking another effect to a ship for a number of turns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickyEffect {
    pub base: Box<EffectKind>,
    /// Turns the effect stays on the ship.
    pub duration: u32,
}

impl StickyEffect {
    pub fn new(base: impl Into<EffectKind>, duration: u32) -> Self {
        Self {
            base: Box::new(base.into()),
            duration,
        }
    }

    /// Sticks the wrapped effect, replacing a previous application from the
    /// same source, then applies it once.
    pub(super) fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        let key = EffectKey::Sticky {
            source: ctx.source,
            index: ctx.index,
        };

        let mut diffs = Vec::new();
        if let Some(previous) = target.effect(&key) {
            diffs.extend(previous.removal_diffs(target));
        }
        diffs.push(BattleDiff::ShipEffectAdded {
            ship: target.id,
            effect: ActiveEffect {
                key,
                effect: (*self.base).clone(),
                remaining: Some(self.duration),
            },
        });
        diffs.extend(self.base.on_diffs(ctx, target));
        diffs
    }

    pub fn description(&self) -> String {
        let plural = if self.duration > 1 { "s" } else { "" };
        format!(
            "{} for {} turn{plural}",
            self.base.description(),
            self.duration
        )
    }
}
