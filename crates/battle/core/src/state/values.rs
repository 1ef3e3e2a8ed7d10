//! Ship values (current amounts) and attributes (derived from modifiers).

/// Bounded current amount carried by a ship.
///
/// Power is the action point pool spent by every action.
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ValueKind {
    Hull,
    Shield,
    Power,
}

impl ValueKind {
    /// Attribute bounding this value.
    pub const fn capacity(self) -> AttributeKind {
        match self {
            Self::Hull => AttributeKind::HullCapacity,
            Self::Shield => AttributeKind::ShieldCapacity,
            Self::Power => AttributeKind::PowerCapacity,
        }
    }
}

/// Derived ship characteristic, resolved from a set of modifiers.
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttributeKind {
    HullCapacity,
    ShieldCapacity,
    PowerCapacity,
    Maneuvrability,
    Precision,
}

/// Current values of a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipValues {
    pub hull: i64,
    pub shield: i64,
    pub power: i64,
}

impl ShipValues {
    pub const fn get(&self, kind: ValueKind) -> i64 {
        match kind {
            ValueKind::Hull => self.hull,
            ValueKind::Shield => self.shield,
            ValueKind::Power => self.power,
        }
    }

    pub fn get_mut(&mut self, kind: ValueKind) -> &mut i64 {
        match kind {
            ValueKind::Hull => &mut self.hull,
            ValueKind::Shield => &mut self.shield,
            ValueKind::Power => &mut self.power,
        }
    }
}

/// A single modifier contributing to an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeModifier {
    /// Added to the base sum.
    Cumulative(i64),
    /// Percent bonus (or malus) applied to the sum.
    Multiplier(i64),
    /// Upper bound of the resolved value.
    Limit(i64),
}

/// An attribute resolved from modifier multisets.
///
/// The multisets are kept sorted, so adding then removing a modifier (in any
/// order) restores an equal attribute.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipAttribute {
    current: i64,
    cumulatives: Vec<i64>,
    multipliers: Vec<i64>,
    limits: Vec<i64>,
}

impl ShipAttribute {
    pub const fn get(&self) -> i64 {
        self.current
    }

    /// Bound enforced by limit modifiers, `None` when unlimited.
    pub fn maximal(&self) -> Option<i64> {
        self.limits.first().copied()
    }

    pub fn reset(&mut self) {
        self.cumulatives.clear();
        self.multipliers.clear();
        self.limits.clear();
        self.update();
    }

    pub fn add_modifier(&mut self, modifier: AttributeModifier) {
        let (list, value) = self.list_mut(modifier);
        let position = list.partition_point(|existing| *existing < value);
        list.insert(position, value);
        self.update();
    }

    /// Removes one occurrence of the modifier; returns false if absent.
    pub fn remove_modifier(&mut self, modifier: AttributeModifier) -> bool {
        let (list, value) = self.list_mut(modifier);
        match list.binary_search(&value) {
            Ok(position) => {
                list.remove(position);
                self.update();
                true
            }
            Err(_) => false,
        }
    }

    fn list_mut(&mut self, modifier: AttributeModifier) -> (&mut Vec<i64>, i64) {
        match modifier {
            AttributeModifier::Cumulative(value) => (&mut self.cumulatives, value),
            AttributeModifier::Multiplier(value) => (&mut self.multipliers, value),
            AttributeModifier::Limit(value) => (&mut self.limits, value),
        }
    }

    fn update(&mut self) {
        let mut value: i64 = self.cumulatives.iter().sum();
        if !self.multipliers.is_empty() {
            let factor = 1.0 + self.multipliers.iter().sum::<i64>() as f64 / 100.0;
            value = round_half_up(value as f64 * factor);
        }
        if let Some(limit) = self.maximal() {
            value = value.min(limit);
        }
        self.current = value;
    }
}

/// Rounds to the nearest integer, halves toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// All attributes of a ship.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipAttributes {
    pub hull_capacity: ShipAttribute,
    pub shield_capacity: ShipAttribute,
    pub power_capacity: ShipAttribute,
    pub maneuvrability: ShipAttribute,
    pub precision: ShipAttribute,
}

impl ShipAttributes {
    pub const fn get(&self, kind: AttributeKind) -> &ShipAttribute {
        match kind {
            AttributeKind::HullCapacity => &self.hull_capacity,
            AttributeKind::ShieldCapacity => &self.shield_capacity,
            AttributeKind::PowerCapacity => &self.power_capacity,
            AttributeKind::Maneuvrability => &self.maneuvrability,
            AttributeKind::Precision => &self.precision,
        }
    }

    pub fn get_mut(&mut self, kind: AttributeKind) -> &mut ShipAttribute {
        match kind {
            AttributeKind::HullCapacity => &mut self.hull_capacity,
            AttributeKind::ShieldCapacity => &mut self.shield_capacity,
            AttributeKind::PowerCapacity => &mut self.power_capacity,
            AttributeKind::Maneuvrability => &mut self.maneuvrability,
            AttributeKind::Precision => &mut self.precision,
        }
    }

    pub fn reset(&mut self) {
        self.hull_capacity.reset();
        self.shield_capacity.reset();
        self.power_capacity.reset();
        self.maneuvrability.reset();
        self.precision.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_resolution_order() {
        let mut attribute = ShipAttribute::default();
        assert_eq!(attribute.get(), 0);

        attribute.add_modifier(AttributeModifier::Cumulative(4));
        attribute.add_modifier(AttributeModifier::Cumulative(6));
        assert_eq!(attribute.get(), 10);

        attribute.add_modifier(AttributeModifier::Multiplier(25));
        assert_eq!(attribute.get(), 13);

        attribute.add_modifier(AttributeModifier::Limit(12));
        attribute.add_modifier(AttributeModifier::Limit(20));
        assert_eq!(attribute.get(), 12);
        assert_eq!(attribute.maximal(), Some(12));

        assert!(attribute.remove_modifier(AttributeModifier::Limit(12)));
        assert_eq!(attribute.get(), 13);
        assert!(!attribute.remove_modifier(AttributeModifier::Limit(12)));
    }

    #[test]
    fn add_then_remove_restores_equal_attribute() {
        let mut attribute = ShipAttribute::default();
        attribute.add_modifier(AttributeModifier::Cumulative(5));
        attribute.add_modifier(AttributeModifier::Cumulative(3));
        let before = attribute.clone();

        attribute.add_modifier(AttributeModifier::Cumulative(5));
        assert!(attribute.remove_modifier(AttributeModifier::Cumulative(5)));
        assert_eq!(attribute, before);

        assert!(attribute.remove_modifier(AttributeModifier::Cumulative(5)));
        attribute.add_modifier(AttributeModifier::Cumulative(5));
        assert_eq!(attribute, before);
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(1.49), 1);
    }

    #[test]
    fn value_kinds_map_to_capacities() {
        assert_eq!(ValueKind::Hull.capacity(), AttributeKind::HullCapacity);
        assert_eq!(ValueKind::Power.to_string(), "power");
        assert_eq!(AttributeKind::ShieldCapacity.as_ref(), "shield_capacity");
    }
}
