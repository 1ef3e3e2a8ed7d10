//! Authoritative battle state representation.
//!
//! This module owns the data structures describing fleets, ships, equipment,
//! drones and the arena. Runtime layers clone or query this state but mutate
//! it exclusively through diffs applied by the engine.
mod arena;
mod battle;
mod cooldown;
mod drone;
mod equipment;
mod exclusion;
mod fleet;
mod ids;
mod ship;
mod target;
mod values;

pub use arena::{ArenaCircleArea, ArenaLocation, ArenaLocationAngle, angular_difference};
#[cfg(feature = "serde")]
pub use battle::SnapshotError;
pub use battle::{Battle, BattleOutcome, BattleSetupError, BattleStatus};
pub use cooldown::Cooldown;
pub use drone::Drone;
pub use equipment::{Equipment, SlotKind, ToggleState};
pub use exclusion::ExclusionAreas;
pub use fleet::{Fleet, PlayerKind};
pub use ids::{DroneId, EquipmentId, FleetId, ShipId};
pub use ship::{EquipError, Ship};
pub use target::Target;
pub(crate) use values::round_half_up;
pub use values::{
    AttributeKind, AttributeModifier, ShipAttribute, ShipAttributes, ShipValues, ValueKind,
};
