//! AI maneuver planner.
//!
//! The planner works on a battle it owns (usually decoded from a snapshot)
//! and never mutates it:
//!
//! 1. **Production**: [`ManeuverGenerator`] proposes end turn, shots, blast
//!    shots, toggles, moves across a jittered arena grid and drone drops.
//! 2. **Simulation**: each candidate is applied on a clone through the battle
//!    engine, with a copy of the battle generator.
//! 3. **Evaluation**: the [`Evaluator`]s rate the simulated diffs; ratings are
//!    weighted and summed.
//! 4. **Selection**: the best score wins, near ties are broken at random.
//!
//! One maneuver is chosen per request; the runtime asks again after applying
//! it, until the ship ends its turn.
pub mod config;
pub mod evaluators;
pub mod maneuver;
pub mod producers;
pub mod tactical;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EvaluatorWeights, Personality, PlannerConfig};
pub use evaluators::{Evaluator, score};
pub use maneuver::{Maneuver, ScoredManeuver, SimulatedManeuver, Simulation};
pub use producers::{ManeuverGenerator, scan_arena};
pub use tactical::{Cancelled, TacticalPlanner};
