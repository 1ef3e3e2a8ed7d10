use crate::action::ActionKind;
use crate::effect::EffectKind;

use super::{Cooldown, EquipmentId};

/// Kind of slot a piece of equipment fits in.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SlotKind {
    Hull,
    Shield,
    Power,
    Engine,
    Weapon,
}

/// Activation state of a toggle (or vigilance) action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToggleState {
    pub activated: bool,
    /// Vigilance intrusions counted since activation.
    pub intrusions: u32,
}

/// A piece of equipment mounted in a ship slot.
///
/// Equipment grants permanent `effects` while mounted and may expose one
/// usable action, gated by its cooldown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub id: EquipmentId,
    pub code: String,
    pub slot: SlotKind,
    /// Minimal ship level required to mount it.
    pub level: u32,
    pub effects: Vec<EffectKind>,
    pub action: Option<ActionKind>,
    pub cooldown: Cooldown,
    pub toggle: ToggleState,
}

impl Equipment {
    pub fn new(id: EquipmentId, code: impl Into<String>, slot: SlotKind) -> Self {
        Self {
            id,
            code: code.into(),
            slot,
            level: 1,
            effects: Vec::new(),
            action: None,
            cooldown: Cooldown::default(),
            toggle: ToggleState::default(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<EffectKind>) -> Self {
        self.effects.push(effect.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<ActionKind>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, max_uses: u32, overheat_turns: u32) -> Self {
        self.cooldown.configure(max_uses, overheat_turns);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Returns true for an activated toggle or vigilance action.
    pub fn is_toggled_on(&self) -> bool {
        self.toggle.activated && self.action.as_ref().is_some_and(ActionKind::is_toggle)
    }
}
