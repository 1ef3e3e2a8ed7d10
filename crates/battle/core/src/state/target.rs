use super::{ArenaLocation, Battle, ShipId};

/// Target of an action: a ship or a bare arena location.
///
/// Ship targets are resolved against the battle at use time, so a target
/// built on one battle instance stays meaningful on a structurally equal one.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Ship(ShipId),
    Location(ArenaLocation),
}

impl Target {
    pub const fn location(x: f64, y: f64) -> Self {
        Self::Location(ArenaLocation::new(x, y))
    }

    pub const fn ship_id(&self) -> Option<ShipId> {
        match self {
            Self::Ship(id) => Some(*id),
            Self::Location(_) => None,
        }
    }

    pub const fn is_ship(&self) -> bool {
        matches!(self, Self::Ship(_))
    }

    /// Current arena location of the target, `None` for an unknown ship.
    pub fn resolve(&self, battle: &Battle) -> Option<ArenaLocation> {
        match self {
            Self::Ship(id) => battle.ship(*id).map(|ship| ship.location.location()),
            Self::Location(location) => Some(*location),
        }
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ship(id) => write!(f, "{id}"),
            Self::Location(location) => write!(f, "({:.1},{:.1})", location.x, location.y),
        }
    }
}
