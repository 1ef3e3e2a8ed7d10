//! Attribute modifying effects.
//!
//! All three variants add one modifier while active and remove it when off.

use crate::diff::BattleDiff;
use crate::state::{AttributeKind, AttributeModifier, Ship};

fn added(target: &Ship, attribute: AttributeKind, modifier: AttributeModifier) -> Vec<BattleDiff> {
    vec![BattleDiff::ShipAttribute {
        ship: target.id,
        attribute,
        added: Some(modifier),
        removed: None,
    }]
}

fn removed(
    target: &Ship,
    attribute: AttributeKind,
    modifier: AttributeModifier,
) -> Vec<BattleDiff> {
    vec![BattleDiff::ShipAttribute {
        ship: target.id,
        attribute,
        added: None,
        removed: Some(modifier),
    }]
}

/// Add a cumulative amount to an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeEffect {
    pub attribute: AttributeKind,
    pub value: i64,
}

impl AttributeEffect {
    pub fn new(attribute: AttributeKind, value: i64) -> Self {
        Self { attribute, value }
    }

    pub(super) fn on_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        added(target, self.attribute, AttributeModifier::Cumulative(self.value))
    }

    pub(super) fn off_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        removed(target, self.attribute, AttributeModifier::Cumulative(self.value))
    }
}

/// Boost or reduce an attribute, in percent (`20` for +20%).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeMultiplyEffect {
    pub attribute: AttributeKind,
    pub value: i64,
}

impl AttributeMultiplyEffect {
    pub fn new(attribute: AttributeKind, value: i64) -> Self {
        Self { attribute, value }
    }

    pub(super) fn on_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        added(target, self.attribute, AttributeModifier::Multiplier(self.value))
    }

    pub(super) fn off_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        removed(target, self.attribute, AttributeModifier::Multiplier(self.value))
    }
}

/// Cap the resolved value of an attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeLimitEffect {
    pub attribute: AttributeKind,
    pub value: i64,
}

impl AttributeLimitEffect {
    pub fn new(attribute: AttributeKind, value: i64) -> Self {
        Self { attribute, value }
    }

    pub(super) fn on_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        added(target, self.attribute, AttributeModifier::Limit(self.value))
    }

    pub(super) fn off_diffs(&self, target: &Ship) -> Vec<BattleDiff> {
        removed(target, self.attribute, AttributeModifier::Limit(self.value))
    }
}
