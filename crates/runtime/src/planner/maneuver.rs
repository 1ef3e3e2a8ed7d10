//! Maneuvers and their simulated outcome.
use std::fmt;

use serde::{Deserialize, Serialize};

use battle_core::{
    Action, ActionKind, ArenaLocation, Battle, BattleDiff, BattleEngine, DiffLog, Equipment,
    EquipmentId, ExecuteError, PcgRng, Ship, ShipId, Target, ValueKind,
};

/// One simulated player action: use a piece of equipment (or end the
/// turn) on a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub ship: ShipId,
    /// `None` ends the turn.
    pub equipment: Option<EquipmentId>,
    pub target: Target,
}

impl Maneuver {
    pub fn end_turn(ship: ShipId) -> Self {
        Self {
            ship,
            equipment: None,
            target: Target::Ship(ship),
        }
    }

    pub fn new(ship: ShipId, equipment: EquipmentId, target: Target) -> Self {
        Self {
            ship,
            equipment: Some(equipment),
            target,
        }
    }

    pub fn is_end_turn(&self) -> bool {
        self.equipment.is_none()
    }

    pub fn action(&self) -> Action {
        match self.equipment {
            Some(equipment) => Action::equipment(self.ship, equipment, self.target),
            None => Action::end_turn(self.ship),
        }
    }

    /// Equipment and action kind used, looked up on `ship`.
    pub fn equipment_on<'s>(&self, ship: &'s Ship) -> Option<(&'s Equipment, &'s ActionKind)> {
        let equipment = ship.equipment(self.equipment?)?;
        equipment.action.as_ref().map(|action| (equipment, action))
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.equipment {
            Some(equipment) => write!(f, "{} uses {} on {}", self.ship, equipment, self.target),
            None => write!(f, "{} ends its turn", self.ship),
        }
    }
}

/// What applying a maneuver on a copy of the battle produced.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub diffs: Vec<BattleDiff>,
    pub power_used: i64,
    pub final_location: ArenaLocation,
    pub battle_ended: bool,
}

impl Simulation {
    /// Applies `maneuver` on a clone of `battle`; the live battle is never
    /// touched. The random source is copied, so the simulation draws what
    /// the live application would draw next.
    pub fn run(battle: &Battle, maneuver: &Maneuver, rng: &PcgRng) -> Result<Self, ExecuteError> {
        let mut sandbox = battle.clone();
        let mut log = DiffLog::new();
        let mut rng = *rng;
        let power_before = sandbox
            .ship(maneuver.ship)
            .map_or(0, |ship| ship.value(ValueKind::Power));

        let outcome =
            BattleEngine::new(&mut sandbox, &mut log, &mut rng).apply_action(&maneuver.action())?;

        let ship = sandbox.ship(maneuver.ship);
        let power_used = if maneuver.is_end_turn() {
            0
        } else {
            (power_before - ship.map_or(0, |ship| ship.value(ValueKind::Power))).max(0)
        };
        let final_location = ship
            .map(|ship| ship.location.location())
            .unwrap_or_default();
        Ok(Self {
            diffs: log.as_slice().to_vec(),
            power_used,
            final_location,
            battle_ended: outcome.battle_ended,
        })
    }
}

/// A maneuver with its simulation.
#[derive(Debug, Clone)]
pub struct SimulatedManeuver {
    pub maneuver: Maneuver,
    pub simulation: Simulation,
}

/// Maneuver chosen by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredManeuver {
    pub maneuver: Maneuver,
    pub score: f64,
}
