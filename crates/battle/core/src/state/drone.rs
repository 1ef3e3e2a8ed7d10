use crate::action::ActionFilter;
use crate::effect::EffectKind;

use super::{ArenaCircleArea, ArenaLocation, DroneId, EquipmentId, ShipId};

/// A deployed drone, applying its effects to ships within its radius.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drone {
    pub id: DroneId,
    pub owner: ShipId,
    /// Equipment that deployed it.
    pub equipment: EquipmentId,
    pub code: String,
    pub location: ArenaLocation,
    pub radius: f64,
    /// Owner turns left before self-destruction.
    pub remaining: u32,
    pub filter: ActionFilter,
    pub effects: Vec<EffectKind>,
}

impl Drone {
    pub fn area(&self) -> ArenaCircleArea {
        ArenaCircleArea::new(self.location.x, self.location.y, self.radius)
    }

    pub fn is_in_range(&self, location: &ArenaLocation) -> bool {
        location.is_inside(&self.area())
    }
}
