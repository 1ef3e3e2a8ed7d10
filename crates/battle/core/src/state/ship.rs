use crate::action::{ActionKind, ToggleAction};
use crate::diff::BattleDiff;
use crate::effect::{ActiveEffect, EffectKey, EffectKind};
use crate::error::{BattleError, ErrorSeverity};

use super::{
    ArenaLocationAngle, AttributeKind, Equipment, EquipmentId, FleetId, ShipAttributes, ShipId,
    ShipValues, SlotKind, ValueKind,
};

/// Errors raised while fitting equipment on a ship before battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipError {
    #[error("no free {slot} slot")]
    NoFreeSlot { slot: SlotKind },

    #[error("equipment requires level {required}, ship is level {level}")]
    LevelTooLow { required: u32, level: u32 },

    #[error("equipment {0} already mounted")]
    DuplicateEquipment(EquipmentId),
}

impl BattleError for EquipError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoFreeSlot { .. } => "EQUIP_NO_FREE_SLOT",
            Self::LevelTooLow { .. } => "EQUIP_LEVEL_TOO_LOW",
            Self::DuplicateEquipment(_) => "EQUIP_DUPLICATE",
        }
    }
}

/// A ship engaged in a battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ship {
    pub id: ShipId,
    pub fleet: FleetId,
    pub name: String,
    pub level: u32,
    pub location: ArenaLocationAngle,
    pub alive: bool,
    pub slots: Vec<SlotKind>,
    pub equipment: Vec<Equipment>,
    pub values: ShipValues,
    pub attributes: ShipAttributes,
    /// Sticky and area effects, sorted by key.
    pub active_effects: Vec<ActiveEffect>,
    /// Initiative drawn at battle start.
    pub play_priority: f64,
}

impl Ship {
    /// Default slot layout of a line ship.
    pub const DEFAULT_SLOTS: [SlotKind; 6] = [
        SlotKind::Hull,
        SlotKind::Shield,
        SlotKind::Power,
        SlotKind::Engine,
        SlotKind::Weapon,
        SlotKind::Weapon,
    ];

    pub fn new(id: ShipId, fleet: FleetId, name: impl Into<String>) -> Self {
        Self {
            id,
            fleet,
            name: name.into(),
            level: 1,
            location: ArenaLocationAngle::default(),
            alive: true,
            slots: Self::DEFAULT_SLOTS.to_vec(),
            equipment: Vec::new(),
            values: ShipValues::default(),
            attributes: ShipAttributes::default(),
            active_effects: Vec::new(),
            play_priority: 0.0,
        }
    }

    #[must_use]
    pub fn with_slots(mut self, slots: Vec<SlotKind>) -> Self {
        self.slots = slots;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn at(mut self, x: f64, y: f64, angle: f64) -> Self {
        self.location = ArenaLocationAngle::new(x, y, angle);
        self
    }

    /// Mounts equipment in a free slot of the matching kind.
    pub fn equip(&mut self, equipment: Equipment) -> Result<(), EquipError> {
        if self.equipment.iter().any(|mounted| mounted.id == equipment.id) {
            return Err(EquipError::DuplicateEquipment(equipment.id));
        }
        if equipment.level > self.level {
            return Err(EquipError::LevelTooLow {
                required: equipment.level,
                level: self.level,
            });
        }
        let capacity = self.slots.iter().filter(|slot| **slot == equipment.slot).count();
        let used = self
            .equipment
            .iter()
            .filter(|mounted| mounted.slot == equipment.slot)
            .count();
        if used >= capacity {
            return Err(EquipError::NoFreeSlot {
                slot: equipment.slot,
            });
        }
        self.equipment.push(equipment);
        Ok(())
    }

    pub fn equipment(&self, id: EquipmentId) -> Option<&Equipment> {
        self.equipment.iter().find(|equipment| equipment.id == id)
    }

    pub fn equipment_mut(&mut self, id: EquipmentId) -> Option<&mut Equipment> {
        self.equipment.iter_mut().find(|equipment| equipment.id == id)
    }

    /// Mounted equipment of a given slot kind.
    pub fn equipment_in(&self, slot: SlotKind) -> impl Iterator<Item = &Equipment> {
        self.equipment.iter().filter(move |equipment| equipment.slot == slot)
    }

    // ========================================================================
    // Values and attributes
    // ========================================================================

    pub fn value(&self, kind: ValueKind) -> i64 {
        self.values.get(kind)
    }

    pub fn attribute(&self, kind: AttributeKind) -> i64 {
        self.attributes.get(kind).get()
    }

    /// Maximal amount for a value (its capacity attribute, never negative).
    pub fn capacity(&self, kind: ValueKind) -> i64 {
        self.attribute(kind.capacity()).max(0)
    }

    /// Diffs changing a value by `delta`, clamped into `[0, capacity]`.
    pub fn value_diffs(&self, kind: ValueKind, delta: i64) -> Vec<BattleDiff> {
        let current = self.value(kind);
        let target = (current + delta).clamp(0, self.capacity(kind));
        if target == current {
            Vec::new()
        } else {
            vec![BattleDiff::ShipValue {
                ship: self.id,
                value: kind,
                delta: target - current,
            }]
        }
    }

    /// Diffs setting a value to an absolute amount.
    pub fn value_set_diffs(&self, kind: ValueKind, value: i64) -> Vec<BattleDiff> {
        let current = self.value(kind);
        if current == value {
            Vec::new()
        } else {
            vec![BattleDiff::ShipValue {
                ship: self.id,
                value: kind,
                delta: value - current,
            }]
        }
    }

    // ========================================================================
    // Effects
    // ========================================================================

    pub fn effect(&self, key: &EffectKey) -> Option<&ActiveEffect> {
        self.active_effects
            .binary_search_by(|effect| effect.key.cmp(key))
            .ok()
            .map(|index| &self.active_effects[index])
    }

    /// Inserts an effect; returns false if its key is already present.
    pub(crate) fn insert_effect(&mut self, effect: ActiveEffect) -> bool {
        match self
            .active_effects
            .binary_search_by(|existing| existing.key.cmp(&effect.key))
        {
            Ok(_) => false,
            Err(index) => {
                self.active_effects.insert(index, effect);
                true
            }
        }
    }

    pub(crate) fn remove_effect(&mut self, key: &EffectKey) -> Option<ActiveEffect> {
        self.active_effects
            .binary_search_by(|effect| effect.key.cmp(key))
            .ok()
            .map(|index| self.active_effects.remove(index))
    }

    pub(crate) fn effect_mut(&mut self, key: &EffectKey) -> Option<&mut ActiveEffect> {
        self.active_effects
            .binary_search_by(|effect| effect.key.cmp(key))
            .ok()
            .map(move |index| &mut self.active_effects[index])
    }

    /// All effects currently shaping the ship: permanent equipment effects,
    /// then sticky and area effects.
    pub fn effects(&self) -> impl Iterator<Item = &EffectKind> {
        self.equipment
            .iter()
            .flat_map(|equipment| equipment.effects.iter())
            .chain(self.active_effects.iter().map(|active| &active.effect))
    }

    /// `Some(hard)` when the ship carries a pin effect.
    pub fn pinned(&self) -> Option<bool> {
        self.effects()
            .filter_map(|effect| match effect {
                EffectKind::Pinned(pin) => Some(pin.hard),
                _ => None,
            })
            .reduce(|a, b| a || b)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Activated toggle actions with their equipment.
    pub fn active_toggles(&self) -> impl Iterator<Item = (&Equipment, &ToggleAction)> {
        self.equipment.iter().filter_map(|equipment| {
            if !equipment.toggle.activated {
                return None;
            }
            match &equipment.action {
                Some(ActionKind::Toggle(toggle)) => Some((equipment, toggle)),
                Some(ActionKind::Vigilance(vigilance)) => Some((equipment, &vigilance.toggle)),
                _ => None,
            }
        })
    }

    pub fn has_active_vigilance(&self) -> bool {
        self.equipment.iter().any(|equipment| {
            equipment.toggle.activated && matches!(equipment.action, Some(ActionKind::Vigilance(_)))
        })
    }

    /// Power reserved by activated toggles.
    pub fn toggled_power(&self) -> i64 {
        self.active_toggles().map(|(_, toggle)| toggle.power).sum()
    }

    /// Resets the ship to its pre-battle state.
    ///
    /// Attributes are rebuilt from the permanent equipment effects and values
    /// are filled up to capacity. This happens before any diff is logged.
    pub fn restore_initial_state(&mut self) {
        self.alive = true;
        self.active_effects.clear();
        self.attributes.reset();
        let modifiers: Vec<_> = self
            .equipment
            .iter()
            .flat_map(|equipment| equipment.effects.iter())
            .filter_map(EffectKind::permanent_modifier)
            .collect();
        for (attribute, modifier) in modifiers {
            self.attributes.get_mut(attribute).add_modifier(modifier);
        }
        self.values.hull = self.capacity(ValueKind::Hull);
        self.values.shield = self.capacity(ValueKind::Shield);
        self.values.power = self.capacity(ValueKind::Power);
        for equipment in &mut self.equipment {
            equipment.cooldown.reset();
            equipment.toggle = Default::default();
        }
    }
}
