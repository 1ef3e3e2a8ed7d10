//! Planner tuning knobs.
use std::collections::HashMap;

use battle_core::FleetId;

/// Weights applied to each maneuver evaluator before summing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorWeights {
    pub turn_cost: f64,
    pub overheat: f64,
    pub enemy_health: f64,
    pub ally_health: f64,
    pub active_effects: f64,
    pub clustering: f64,
    pub position: f64,
    pub idling: f64,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            turn_cost: 1.0,
            overheat: 3.0,
            enemy_health: 5.0,
            ally_health: 20.0,
            active_effects: 3.0,
            clustering: 4.0,
            position: 0.5,
            idling: 2.0,
        }
    }
}

/// Temper of a fleet's commander, reshaping the evaluator weights.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Personality {
    #[default]
    Balanced,
    /// Trades own hull for enemy damage.
    Aggressive,
    /// Shields allies first, even at a higher cost.
    Heroic,
}

impl Personality {
    pub fn apply(self, base: &EvaluatorWeights) -> EvaluatorWeights {
        let mut weights = *base;
        match self {
            Self::Balanced => {}
            Self::Aggressive => {
                weights.enemy_health *= 2.0;
                weights.ally_health *= 0.5;
                weights.position *= 0.5;
            }
            Self::Heroic => {
                weights.ally_health *= 2.0;
                weights.active_effects *= 2.0;
                weights.turn_cost *= 0.5;
            }
        }
        weights
    }
}

/// Configuration of the tactical planner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub weights: EvaluatorWeights,
    /// Fleets not listed here play [`Personality::Balanced`].
    pub personalities: HashMap<FleetId, Personality>,
    /// Grid side used to scan the arena for moves and blast shots.
    pub scan_cells: u32,
    /// Maneuvers a ship may chain before its turn is ended for it.
    pub max_maneuvers_per_turn: u32,
    /// Scores closer than this are ties, broken at random.
    pub tie_epsilon: f64,
}

impl PlannerConfig {
    pub const DEFAULT_SCAN_CELLS: u32 = 10;
    pub const DEFAULT_MAX_MANEUVERS_PER_TURN: u32 = 20;
    pub const DEFAULT_TIE_EPSILON: f64 = 1e-4;

    #[must_use]
    pub fn with_personality(mut self, fleet: FleetId, personality: Personality) -> Self {
        self.personalities.insert(fleet, personality);
        self
    }

    /// Weights used when planning for a ship of `fleet`.
    pub fn weights_for(&self, fleet: FleetId) -> EvaluatorWeights {
        self.personalities
            .get(&fleet)
            .copied()
            .unwrap_or_default()
            .apply(&self.weights)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            weights: EvaluatorWeights::default(),
            personalities: HashMap::new(),
            scan_cells: Self::DEFAULT_SCAN_CELLS,
            max_maneuvers_per_turn: Self::DEFAULT_MAX_MANEUVERS_PER_TURN,
            tie_epsilon: Self::DEFAULT_TIE_EPSILON,
        }
    }
}
