use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};

use super::{ArenaLocation, Drone, DroneId, Fleet, FleetId, PlayerKind, Ship, ShipId};

/// Lifecycle of a battle: `NotStarted → InProgress → Ended`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattleStatus {
    #[default]
    NotStarted,
    InProgress,
    Ended,
}

/// Final result of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleOutcome {
    /// Winning fleet, `None` for a draw.
    pub winner: Option<FleetId>,
    pub cycle: u32,
}

/// Errors raised while assembling a battle, before it starts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleSetupError {
    #[error("unknown fleet {0}")]
    UnknownFleet(FleetId),

    #[error("duplicate fleet {0}")]
    DuplicateFleet(FleetId),

    #[error("duplicate ship {0}")]
    DuplicateShip(ShipId),

    #[error("a battle needs at least two fleets, got {0}")]
    NotEnoughFleets(usize),

    #[error("fleet {0} has no ship")]
    EmptyFleet(FleetId),

    #[error("battle already started")]
    AlreadyStarted,
}

impl BattleError for BattleSetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFleet(_) => "SETUP_UNKNOWN_FLEET",
            Self::DuplicateFleet(_) => "SETUP_DUPLICATE_FLEET",
            Self::DuplicateShip(_) => "SETUP_DUPLICATE_SHIP",
            Self::NotEnoughFleets(_) => "SETUP_NOT_ENOUGH_FLEETS",
            Self::EmptyFleet(_) => "SETUP_EMPTY_FLEET",
            Self::AlreadyStarted => "SETUP_ALREADY_STARTED",
        }
    }
}

/// Canonical battle state.
///
/// Ships live in a single table and are referenced everywhere else by
/// [`ShipId`]. Once started, the battle only changes through
/// [`BattleDiff`](crate::diff::BattleDiff) application.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battle {
    pub config: BattleConfig,
    pub fleets: Vec<Fleet>,
    pub ships: Vec<Ship>,
    /// Deployed drones, sorted by id.
    pub drones: Vec<Drone>,
    /// Alive ships in initiative order.
    pub play_order: Vec<ShipId>,
    pub playing_index: usize,
    pub cycle: u32,
    pub status: BattleStatus,
    pub outcome: Option<BattleOutcome>,
}

impl Default for Battle {
    fn default() -> Self {
        Self::new(BattleConfig::default())
    }
}

impl Battle {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            fleets: Vec::new(),
            ships: Vec::new(),
            drones: Vec::new(),
            play_order: Vec::new(),
            playing_index: 0,
            cycle: 0,
            status: BattleStatus::NotStarted,
            outcome: None,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    pub fn add_fleet(
        &mut self,
        id: FleetId,
        name: impl Into<String>,
        player: PlayerKind,
    ) -> Result<FleetId, BattleSetupError> {
        if self.status != BattleStatus::NotStarted {
            return Err(BattleSetupError::AlreadyStarted);
        }
        if self.fleet(id).is_some() {
            return Err(BattleSetupError::DuplicateFleet(id));
        }
        self.fleets.push(Fleet::new(id, name, player));
        Ok(id)
    }

    /// Adds a ship to the fleet it references.
    pub fn add_ship(&mut self, ship: Ship) -> Result<ShipId, BattleSetupError> {
        if self.status != BattleStatus::NotStarted {
            return Err(BattleSetupError::AlreadyStarted);
        }
        if self.ship(ship.id).is_some() {
            return Err(BattleSetupError::DuplicateShip(ship.id));
        }
        let id = ship.id;
        let fleet = self
            .fleets
            .iter_mut()
            .find(|fleet| fleet.id == ship.fleet)
            .ok_or(BattleSetupError::UnknownFleet(ship.fleet))?;
        fleet.ships.push(id);
        self.ships.push(ship);
        Ok(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.id == id)
    }

    pub(crate) fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|ship| ship.id == id)
    }

    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.iter().find(|fleet| fleet.id == id)
    }

    /// Ships in fleet order, then in-fleet order.
    pub fn iter_ships(&self) -> impl Iterator<Item = &Ship> {
        self.fleets
            .iter()
            .flat_map(|fleet| fleet.ships.iter())
            .filter_map(|id| self.ship(*id))
    }

    pub fn iter_alive_ships(&self) -> impl Iterator<Item = &Ship> {
        self.iter_ships().filter(|ship| ship.alive)
    }

    /// Alive ships of the given fleet.
    pub fn allies_of(&self, fleet: FleetId) -> impl Iterator<Item = &Ship> {
        self.iter_alive_ships().filter(move |ship| ship.fleet == fleet)
    }

    /// Alive ships of every other fleet.
    pub fn enemies_of(&self, fleet: FleetId) -> impl Iterator<Item = &Ship> {
        self.iter_alive_ships().filter(move |ship| ship.fleet != fleet)
    }

    pub fn fleet_is_alive(&self, fleet: FleetId) -> bool {
        self.allies_of(fleet).next().is_some()
    }

    /// Alive ships whose center lies within `radius` of `center`.
    pub fn ships_in_circle(&self, center: &ArenaLocation, radius: f64) -> Vec<ShipId> {
        self.iter_alive_ships()
            .filter(|ship| ship.location.location().distance_to(center) <= radius)
            .map(|ship| ship.id)
            .collect()
    }

    pub fn playing_ship_id(&self) -> Option<ShipId> {
        if self.status == BattleStatus::InProgress {
            self.play_order.get(self.playing_index).copied()
        } else {
            None
        }
    }

    pub fn playing_ship(&self) -> Option<&Ship> {
        self.playing_ship_id().and_then(|id| self.ship(id))
    }

    pub fn is_playing(&self, ship: ShipId) -> bool {
        self.playing_ship_id() == Some(ship)
    }

    /// Ship that plays after the current one.
    pub fn next_ship_id(&self) -> Option<ShipId> {
        if self.play_order.is_empty() {
            None
        } else {
            self.play_order
                .get((self.playing_index + 1) % self.play_order.len())
                .copied()
        }
    }

    /// Turns before `ship` plays (0 for the playing ship), `None` if not in play.
    pub fn turns_before(&self, ship: ShipId) -> Option<usize> {
        let index = self.play_order.iter().position(|id| *id == ship)?;
        let len = self.play_order.len();
        Some((index + len - self.playing_index % len.max(1)) % len)
    }

    pub fn is_ended(&self) -> bool {
        self.status == BattleStatus::Ended
    }

    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.drones
            .binary_search_by(|drone| drone.id.cmp(&id))
            .ok()
            .map(|index| &self.drones[index])
    }

    /// Smallest id above every drone currently deployed.
    pub fn next_drone_id(&self) -> DroneId {
        DroneId(self.drones.last().map_or(1, |drone| drone.id.0 + 1))
    }

    pub fn drones_of(&self, owner: ShipId) -> impl Iterator<Item = &Drone> {
        self.drones.iter().filter(move |drone| drone.owner == owner)
    }
}

#[cfg(feature = "serde")]
mod snapshot {
    use sha2::{Digest, Sha256};

    use super::Battle;

    /// Errors raised while encoding or decoding battle snapshots.
    #[derive(Debug, thiserror::Error)]
    pub enum SnapshotError {
        #[error("snapshot encoding failed: {0}")]
        Encode(#[source] bincode::Error),

        #[error("snapshot decoding failed: {0}")]
        Decode(#[source] bincode::Error),
    }

    impl crate::error::BattleError for SnapshotError {
        fn severity(&self) -> crate::error::ErrorSeverity {
            crate::error::ErrorSeverity::Internal
        }
    }

    impl Battle {
        /// Lossless binary snapshot, used to cross the worker boundary.
        pub fn to_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
            bincode::serialize(self).map_err(SnapshotError::Encode)
        }

        pub fn from_snapshot(bytes: &[u8]) -> Result<Self, SnapshotError> {
            bincode::deserialize(bytes).map_err(SnapshotError::Decode)
        }

        /// Hex SHA-256 of the binary snapshot.
        ///
        /// Two peers replaying the same diff stream must report the same digest.
        pub fn state_digest(&self) -> Result<String, SnapshotError> {
            let bytes = self.to_snapshot()?;
            Ok(hex::encode(Sha256::digest(&bytes)))
        }
    }
}

#[cfg(feature = "serde")]
pub use snapshot::SnapshotError;
