//! Maneuver scoring.
//!
//! Every evaluator rates a simulated maneuver in `[-1, 1]` from the point of
//! view of the acting ship, before the maneuver. The planner sums the
//! weighted ratings.
use strum::IntoEnumIterator;

use battle_core::{ActionKind, Battle, BattleDiff, Ship, ValueKind};

use super::config::EvaluatorWeights;
use super::maneuver::SimulatedManeuver;

/// Scoring rules of the tactical planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Evaluator {
    /// Power left after the maneuver; doing nothing is penalized.
    TurnCost,
    /// Using the last charge before an overheat.
    Overheat,
    /// Damage and deaths inflicted on enemies.
    EnemyHealth,
    /// Damage and deaths suffered by allies.
    AllyHealth,
    /// Effects gained or lost, on the right side.
    ActiveEffects,
    /// Ending close to other ships.
    Clustering,
    /// Distance from the arena borders.
    Position,
    /// Power left unused at the end of the turn.
    Idling,
}

impl Evaluator {
    pub fn weight(self, weights: &EvaluatorWeights) -> f64 {
        match self {
            Self::TurnCost => weights.turn_cost,
            Self::Overheat => weights.overheat,
            Self::EnemyHealth => weights.enemy_health,
            Self::AllyHealth => weights.ally_health,
            Self::ActiveEffects => weights.active_effects,
            Self::Clustering => weights.clustering,
            Self::Position => weights.position,
            Self::Idling => weights.idling,
        }
    }

    /// Unweighted rating of `candidate`, played by `ship` in `battle`.
    pub fn evaluate(self, battle: &Battle, ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
        match self {
            Self::TurnCost => turn_cost(ship, candidate),
            Self::Overheat => overheat(ship, candidate),
            Self::EnemyHealth => {
                let enemies: Vec<_> = battle.enemies_of(ship.fleet).collect();
                -health_effect(&enemies, candidate)
            }
            Self::AllyHealth => {
                let allies: Vec<_> = battle.allies_of(ship.fleet).collect();
                health_effect(&allies, candidate)
            }
            Self::ActiveEffects => active_effects(battle, ship, candidate),
            Self::Clustering => clustering(battle, ship, candidate),
            Self::Position => position(battle, candidate),
            Self::Idling => idling(ship, candidate),
        }
    }
}

/// Weighted sum of every evaluator.
pub fn score(
    battle: &Battle,
    ship: &Ship,
    candidate: &SimulatedManeuver,
    weights: &EvaluatorWeights,
) -> f64 {
    Evaluator::iter()
        .map(|evaluator| evaluator.weight(weights) * evaluator.evaluate(battle, ship, candidate))
        .sum()
}

fn power_capacity(ship: &Ship) -> f64 {
    ship.capacity(ValueKind::Power).max(1) as f64
}

fn action_of<'s>(ship: &'s Ship, candidate: &SimulatedManeuver) -> Option<&'s ActionKind> {
    candidate
        .maneuver
        .equipment_on(ship)
        .map(|(_, action)| action)
}

fn turn_cost(ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    let used = candidate.simulation.power_used;
    let power = ship.value(ValueKind::Power);
    if used == 0 || used > power {
        -1.0
    } else {
        (power - used) as f64 / power_capacity(ship)
    }
}

fn overheat(ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    candidate
        .maneuver
        .equipment_on(ship)
        .map_or(0.0, |(equipment, _)| {
            let cooldown = equipment.cooldown;
            if cooldown.will_overheat() {
                -(0.4 * f64::from(cooldown.overheat_turns)).min(1.0)
            } else {
                0.0
            }
        })
}

/// Change of a ship's health in `[-1, 1]`, `-1` when it is destroyed.
fn proportional_health(ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    let (hull, shield) = (ship.value(ValueKind::Hull), ship.value(ValueKind::Shield));
    let (hull_capacity, shield_capacity) = (
        ship.capacity(ValueKind::Hull),
        ship.capacity(ValueKind::Shield),
    );
    let (mut hull_change, mut shield_change) = (0, 0);
    for diff in &candidate.simulation.diffs {
        if let BattleDiff::ShipValue {
            ship: subject,
            value,
            delta,
        } = diff
        {
            if *subject != ship.id {
                continue;
            }
            match value {
                ValueKind::Hull => hull_change += (hull + delta).clamp(0, hull_capacity) - hull,
                ValueKind::Shield => {
                    shield_change += (shield + delta).clamp(0, shield_capacity) - shield
                }
                ValueKind::Power => {}
            }
        }
    }

    if hull + hull_change <= 0 {
        -1.0
    } else {
        let total = (hull + shield).max(1) as f64;
        ((hull_change + shield_change) as f64 / total).clamp(-1.0, 1.0)
    }
}

fn health_effect(ships: &[&Ship], candidate: &SimulatedManeuver) -> f64 {
    if ships.is_empty() {
        return 0.0;
    }
    let changes: Vec<_> = ships
        .iter()
        .map(|ship| proportional_health(ship, candidate))
        .collect();
    let deaths = changes.iter().filter(|change| **change == -1.0).count() as f64;
    let total: f64 = changes.iter().sum();
    (total * 0.5 - deaths * 0.5) / ships.len() as f64
}

fn active_effects(battle: &Battle, ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    let mut result = 0.0;
    for diff in &candidate.simulation.diffs {
        let (subject, beneficial) = match diff {
            BattleDiff::ShipEffectAdded { ship: target, effect } => {
                (*target, effect.effect.is_beneficial())
            }
            BattleDiff::ShipEffectRemoved { ship: target, effect } => {
                (*target, !effect.effect.is_beneficial())
            }
            _ => continue,
        };
        let enemy = battle
            .ship(subject)
            .is_some_and(|target| target.fleet != ship.fleet);
        result += if beneficial != enemy { 1.0 } else { -1.0 };
    }
    (result / battle.ships.len().max(1) as f64).clamp(-1.0, 1.0)
}

fn clustering(battle: &Battle, ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    let location = candidate.simulation.final_location;
    let factor = battle.config.width.max(battle.config.height) * 0.01;
    let mut others = battle
        .iter_alive_ships()
        .filter(|other| other.id != ship.id)
        .peekable();
    if others.peek().is_none() {
        return 0.0;
    }
    let pressure: f64 = others
        .map(|other| factor / other.location.location().distance_to(&location))
        .sum();
    -pressure.clamp(0.0, 1.0)
}

fn position(battle: &Battle, candidate: &SimulatedManeuver) -> f64 {
    let location = candidate.simulation.final_location;
    let (width, height) = (battle.config.width, battle.config.height);
    let distance = location
        .x
        .min(location.y)
        .min(width - location.x)
        .min(height - location.y);
    let factor = (width / 2.0).min(height / 2.0);
    -1.0 + 2.0 * distance / factor
}

fn idling(ship: &Ship, candidate: &SimulatedManeuver) -> f64 {
    let power = ship.value(ValueKind::Power) as f64;
    let capacity = power_capacity(ship);
    if candidate.maneuver.is_end_turn() {
        return -power / capacity;
    }
    let toggled_on = candidate
        .maneuver
        .equipment_on(ship)
        .is_some_and(|(equipment, _)| equipment.toggle.activated);
    match action_of(ship, candidate) {
        Some(ActionKind::Trigger(_)) => 0.5,
        Some(ActionKind::Toggle(_) | ActionKind::Vigilance(_)) => {
            if toggled_on {
                -0.2
            } else {
                0.5
            }
        }
        Some(ActionKind::Move(_)) => -(power - candidate.simulation.power_used as f64) / capacity,
        _ => 0.0,
    }
}
