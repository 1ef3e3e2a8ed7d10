//! Event types for different topics.

use serde::{Deserialize, Serialize};

use battle_core::{Action, BattleDiff, BattleOutcome, ShipId};

use crate::planner::Maneuver;

/// Diff stream of the live battle.
///
/// Indices are positions in the battle's diff log. A subscriber that lagged
/// behind catches up with a `DiffsSince` query on the battle handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiffEvent {
    /// A diff was applied and appended at `index`.
    Applied { index: usize, diff: BattleDiff },

    /// The last action was undone: its `count` diffs left the log.
    Reverted { count: usize },
}

/// Events related to turn management (lightweight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    /// `ship` starts playing
    ShipChanged { ship: ShipId, cycle: u32 },

    /// A requested action was turned down; nothing changed
    ActionRejected { action: Action, reason: String },

    /// The battle reached a final outcome
    BattleEnded { outcome: BattleOutcome },
}

/// Events emitted while AI fleets are driven by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlannerEvent {
    /// The planner picked a maneuver, about to be applied
    ManeuverChosen {
        ship: ShipId,
        maneuver: Maneuver,
        score: f64,
    },

    /// A planned maneuver no longer fits the live battle and was dropped
    ManeuverStale {
        ship: ShipId,
        maneuver: Maneuver,
        reason: String,
    },

    /// No usable plan (timeout, rejection, turn cap); the turn is ended instead
    Fallback { ship: ShipId, reason: String },
}
