use super::{FleetId, ShipId};

/// Who controls a fleet.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlayerKind {
    Human,
    Ai,
}

/// An ordered group of ships under one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fleet {
    pub id: FleetId,
    pub name: String,
    pub player: PlayerKind,
    pub ships: Vec<ShipId>,
}

impl Fleet {
    pub fn new(id: FleetId, name: impl Into<String>, player: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            player,
            ships: Vec::new(),
        }
    }
}
