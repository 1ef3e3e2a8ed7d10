//! Stable identifiers.
//!
//! Diffs, targets and effect sources reference battle objects through these
//! ids, never through live handles, so a diff stays valid against any
//! structurally equal battle (a clone, a deserialized snapshot, a peer).

macro_rules! battle_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

battle_id!(
    /// Identifier of a ship, unique within a battle.
    ShipId,
    "ship"
);

battle_id!(
    /// Identifier of a fleet, unique within a battle.
    FleetId,
    "fleet"
);

battle_id!(
    /// Identifier of a piece of equipment, unique within its ship.
    EquipmentId,
    "equipment"
);

battle_id!(
    /// Identifier of a deployed drone, unique among the drones alive in a battle.
    DroneId,
    "drone"
);
