//! Effect engine.
//!
//! Effects never mutate a battle themselves. Each variant is a pure function
//! of (battle, target ship, source) producing the diffs that, once applied,
//! realize it. Four hooks exist per variant:
//!
//! - `on_diffs`: the effect takes hold (weapon hit, area entered, sticky added)
//! - `off_diffs`: the effect is removed (area left, toggle off, sticky expired)
//! - `turn_start_diffs` / `turn_end_diffs`: the carrying ship starts or ends a turn
//!
//! Persistent effects are stored on ships as [`ActiveEffect`]s keyed by
//! [`EffectKey`], so adding and removing them is order independent.
mod area;
mod attribute;
mod context;
mod damage;
mod spatial;
mod sticky;
mod value;
mod vigilance;

pub use area::expected_area_effects;
pub use attribute::{AttributeEffect, AttributeLimitEffect, AttributeMultiplyEffect};
pub use context::EffectContext;
pub use damage::{DamageEffect, DamageModifierEffect};
pub use spatial::{PinnedEffect, RepelEffect};
pub use sticky::StickyEffect;
pub use value::{ValueEffect, ValueTransferEffect};
pub use vigilance::VigilanceEffect;

use crate::diff::BattleDiff;
use crate::rng::RandomSource;
use crate::state::{AttributeKind, AttributeModifier, Battle, DroneId, EquipmentId, Ship, ShipId};

// ============================================================================
// Sources and keys
// ============================================================================

/// Where an effect comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSource {
    /// A piece of equipment on a ship (weapon, toggle, vigilance).
    Equipment { ship: ShipId, equipment: EquipmentId },
    /// A deployed drone.
    Drone(DroneId),
}

impl EffectSource {
    /// Ship behind the effect, if the source is a ship.
    pub const fn ship(&self) -> Option<ShipId> {
        match self {
            Self::Equipment { ship, .. } => Some(*ship),
            Self::Drone(_) => None,
        }
    }
}

/// Identity of an effect stored on a ship.
///
/// Area effects are keyed by their provider and position in its effect list,
/// so the post-action checks can tell which expected effects are missing.
/// Sticky effects use the same scheme; the same sticky effect hitting a ship
/// twice refreshes the existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKey {
    Area { source: EffectSource, index: u16 },
    Sticky { source: EffectSource, index: u16 },
}

impl EffectKey {
    pub const fn source(&self) -> EffectSource {
        match self {
            Self::Area { source, .. } | Self::Sticky { source, .. } => *source,
        }
    }

    pub const fn is_sticky(&self) -> bool {
        matches!(self, Self::Sticky { .. })
    }
}

/// An effect living on a ship.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub key: EffectKey,
    /// The effect itself (for sticky effects, the wrapped one).
    pub effect: EffectKind,
    /// Turns left for sticky effects, `None` for area effects.
    pub remaining: Option<u32>,
}

impl ActiveEffect {
    /// Diffs when the carrying ship starts its turn.
    pub fn turn_start_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        let mut diffs = self.effect.turn_start_diffs(ship);
        if let Some(remaining) = self.remaining.filter(|remaining| *remaining > 0) {
            let mut after = self.clone();
            after.remaining = Some(remaining - 1);
            diffs.push(BattleDiff::ShipEffectChanged {
                ship: ship.id,
                before: self.clone(),
                after,
            });
        }
        diffs
    }

    /// Diffs when the carrying ship ends its turn; an elapsed sticky effect
    /// is removed.
    pub fn turn_end_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        let mut diffs = self.effect.turn_end_diffs(ship);
        if self.remaining == Some(0) {
            diffs.extend(self.removal_diffs(ship));
        }
        diffs
    }

    /// Removal marker followed by the effect's off-diffs.
    pub fn removal_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        let mut diffs = vec![BattleDiff::ShipEffectRemoved {
            ship: ship.id,
            effect: self.clone(),
        }];
        diffs.extend(self.effect.off_diffs(ship));
        diffs
    }
}

// ============================================================================
// Effect kinds
// ============================================================================

/// An effect that can be applied on a ship.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    // ========================================================================
    // Damage
    // ========================================================================
    Damage(DamageEffect),
    DamageModifier(DamageModifierEffect),

    // ========================================================================
    // Values and attributes
    // ========================================================================
    Value(ValueEffect),
    Attribute(AttributeEffect),
    AttributeMultiply(AttributeMultiplyEffect),
    AttributeLimit(AttributeLimitEffect),
    ValueTransfer(ValueTransferEffect),

    // ========================================================================
    // Spatial
    // ========================================================================
    Pinned(PinnedEffect),
    Repel(RepelEffect),

    // ========================================================================
    // Persistent and reactive
    // ========================================================================
    Sticky(StickyEffect),
    Vigilance(VigilanceEffect),
}

macro_rules! effect_from {
    ($($variant:ident($effect:ty)),* $(,)?) => {
        $(
            impl From<$effect> for EffectKind {
                fn from(effect: $effect) -> Self {
                    Self::$variant(effect)
                }
            }
        )*
    };
}

effect_from!(
    Damage(DamageEffect),
    DamageModifier(DamageModifierEffect),
    Value(ValueEffect),
    Attribute(AttributeEffect),
    AttributeMultiply(AttributeMultiplyEffect),
    AttributeLimit(AttributeLimitEffect),
    ValueTransfer(ValueTransferEffect),
    Pinned(PinnedEffect),
    Repel(RepelEffect),
    Sticky(StickyEffect),
    Vigilance(VigilanceEffect),
);

impl EffectKind {
    /// Diffs realizing the effect on `target`.
    pub fn on_diffs(&self, ctx: &mut EffectContext<'_>, target: &Ship) -> Vec<BattleDiff> {
        match self {
            Self::Damage(effect) => effect.on_diffs(ctx, target),
            Self::DamageModifier(_) | Self::Pinned(_) => Vec::new(),
            Self::Value(effect) => effect.on_diffs(target),
            Self::Attribute(effect) => effect.on_diffs(target),
            Self::AttributeMultiply(effect) => effect.on_diffs(target),
            Self::AttributeLimit(effect) => effect.on_diffs(target),
            Self::ValueTransfer(effect) => effect.on_diffs(ctx, target),
            Self::Repel(effect) => effect.on_diffs(ctx, target),
            Self::Sticky(effect) => effect.on_diffs(ctx, target),
            Self::Vigilance(effect) => effect.on_diffs(ctx, target),
        }
    }

    /// Diffs undoing a persistent effect when it leaves `target`.
    pub fn off_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        match self {
            Self::Value(effect) => effect.off_diffs(target),
            Self::Attribute(effect) => effect.off_diffs(target),
            Self::AttributeMultiply(effect) => effect.off_diffs(target),
            Self::AttributeLimit(effect) => effect.off_diffs(target),
            Self::Damage(_)
            | Self::DamageModifier(_)
            | Self::ValueTransfer(_)
            | Self::Pinned(_)
            | Self::Repel(_)
            | Self::Sticky(_)
            | Self::Vigilance(_) => Vec::new(),
        }
    }

    pub fn turn_start_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        match self {
            Self::Value(effect) => effect.turn_start_diffs(target),
            _ => Vec::new(),
        }
    }

    pub fn turn_end_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        match self {
            Self::Value(effect) => effect.turn_end_diffs(target),
            _ => Vec::new(),
        }
    }

    /// Whether the effect helps the ship it lands on (AI targeting and scoring).
    pub fn is_beneficial(&self) -> bool {
        match self {
            Self::Damage(_) => false,
            Self::DamageModifier(effect) => effect.percent < 0,
            Self::Value(effect) => effect.is_beneficial(),
            Self::Attribute(effect) => effect.value >= 0,
            Self::AttributeMultiply(_) | Self::AttributeLimit(_) => false,
            Self::ValueTransfer(effect) => effect.amount >= 0,
            Self::Pinned(_) | Self::Repel(_) => false,
            Self::Sticky(effect) => effect.base.is_beneficial(),
            Self::Vigilance(_) => false,
        }
    }

    /// Short machine code, e.g. `attr-precision`.
    pub fn code(&self) -> String {
        match self {
            Self::Damage(_) => "damage".to_owned(),
            Self::DamageModifier(_) => "damagemod".to_owned(),
            Self::Value(effect) => format!("value-{}", effect.value),
            Self::Attribute(effect) => format!("attr-{}", effect.attribute),
            Self::AttributeMultiply(effect) => format!("attrmult-{}", effect.attribute),
            Self::AttributeLimit(effect) => format!("attrlimit-{}", effect.attribute),
            Self::ValueTransfer(effect) => format!("valuetransfer-{}", effect.value),
            Self::Pinned(_) => "pinned".to_owned(),
            Self::Repel(_) => "repel".to_owned(),
            Self::Sticky(effect) => effect.base.code(),
            Self::Vigilance(_) => "vigilance".to_owned(),
        }
    }

    /// Human readable description.
    pub fn description(&self) -> String {
        match self {
            Self::Damage(effect) => effect.description(),
            Self::DamageModifier(effect) => effect.description(),
            Self::Value(effect) => effect.description(),
            Self::Attribute(effect) => {
                format!("{} {:+}", effect.attribute.as_ref().replace('_', " "), effect.value)
            }
            Self::AttributeMultiply(effect) => {
                format!("{} {:+}%", effect.attribute.as_ref().replace('_', " "), effect.value)
            }
            Self::AttributeLimit(effect) => format!(
                "limit {} to {}",
                effect.attribute.as_ref().replace('_', " "),
                effect.value
            ),
            Self::ValueTransfer(effect) => effect.description(),
            Self::Pinned(effect) => effect.description().to_owned(),
            Self::Repel(effect) => format!("repel ships {}km away", effect.distance),
            Self::Sticky(effect) => effect.description(),
            Self::Vigilance(_) => "vigilance".to_owned(),
        }
    }

    /// Attribute modifier granted permanently by mounted equipment.
    pub fn permanent_modifier(&self) -> Option<(AttributeKind, AttributeModifier)> {
        match self {
            Self::Attribute(effect) => Some((
                effect.attribute,
                AttributeModifier::Cumulative(effect.value),
            )),
            Self::AttributeMultiply(effect) => Some((
                effect.attribute,
                AttributeModifier::Multiplier(effect.value),
            )),
            Self::AttributeLimit(effect) => {
                Some((effect.attribute, AttributeModifier::Limit(effect.value)))
            }
            _ => None,
        }
    }

    /// Applies the effect immediately, outside of any log.
    ///
    /// Convenience for setup code and tests; returns whether any diff was
    /// produced. Logged resolution goes through the engine.
    pub fn apply_on_ship(
        &self,
        battle: &mut Battle,
        target: ShipId,
        source: EffectSource,
        rng: &mut dyn RandomSource,
    ) -> Result<bool, crate::diff::IntegrityError> {
        let diffs = {
            let ship = battle
                .ship(target)
                .ok_or(crate::diff::IntegrityError::ShipNotFound(target))?;
            let mut ctx = EffectContext::new(battle, rng, source, 0);
            self.on_diffs(&mut ctx, ship)
        };
        let applied = !diffs.is_empty();
        for diff in diffs {
            diff.apply(battle)?;
        }
        Ok(applied)
    }
}
