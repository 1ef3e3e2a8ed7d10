//! Damage effects.

use crate::diff::BattleDiff;
use crate::state::{Ship, ValueKind, round_half_up};

use super::{EffectContext, EffectKind};

/// Deal damage to a ship: shield first, then hull.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEffect {
    /// Base damage points.
    pub base: i64,
    /// Random extra damage (effective damage lies in `[base, base + span]`).
    pub span: i64,
}

impl DamageEffect {
    pub fn new(base: i64, span: i64) -> Self {
        Self { base, span }
    }

    /// Factor from the damage modifiers carried by the receiving ship.
    pub fn factor(ship: &Ship) -> f64 {
        let percent: i64 = ship
            .effects()
            .filter_map(|effect| match effect {
                EffectKind::DamageModifier(modifier) => Some(modifier.percent),
                _ => None,
            })
            .sum();
        (percent.clamp(-100, 100) + 100) as f64 / 100.0
    }

    /// Damage split between shield and hull, before any diff is applied.
    ///
    /// Returns `(hull, shield, theoretical)`.
    pub fn effective_damage(&self, ship: &Ship, success: f64) -> (i64, i64, i64) {
        let theoretical =
            round_half_up((self.base as f64 + self.span as f64 * success) * Self::factor(ship));
        let mut damage = theoretical.max(0);

        let shield = damage.min(ship.values.shield.max(0));
        damage -= shield;
        let hull = damage.min(ship.values.hull.max(0));
        (hull, shield, theoretical)
    }

    pub(super) fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        let success = if self.span > 0 { ctx.rng.random() } else { 0.0 };
        let (hull, shield, theoretical) = self.effective_damage(target, success);

        let mut diffs = Vec::new();
        if hull != 0 || shield != 0 {
            diffs.push(BattleDiff::ShipDamage {
                ship: target.id,
                hull,
                shield,
                evaded: theoretical - hull - shield,
                theoretical,
            });
        }
        if shield != 0 {
            diffs.push(BattleDiff::ShipValue {
                ship: target.id,
                value: ValueKind::Shield,
                delta: -shield,
            });
        }
        if hull != 0 {
            diffs.push(BattleDiff::ShipValue {
                ship: target.id,
                value: ValueKind::Hull,
                delta: -hull,
            });
        }
        diffs
    }

    pub fn description(&self) -> String {
        if self.span > 0 {
            format!("do {}-{} damage", self.base, self.base + self.span)
        } else {
            format!("do {} damage", self.base)
        }
    }
}

/// Modify the damage received by the carrying ship, in percent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageModifierEffect {
    pub percent: i64,
}

impl DamageModifierEffect {
    pub fn new(percent: i64) -> Self {
        Self { percent }
    }

    pub fn description(&self) -> String {
        format!("{:+}% damage received", self.percent)
    }
}
