//! Greedy tactical planner: one best maneuver per request.
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info};

use battle_core::{Battle, PcgRng, RandomSource, ShipId};

use super::config::PlannerConfig;
use super::evaluators::score;
use super::maneuver::{Maneuver, ScoredManeuver, SimulatedManeuver, Simulation};
use super::producers::ManeuverGenerator;

/// Stream of the search generator forked from the battle generator.
const SEARCH_STREAM: u64 = 0x7ac7_1ca1;

/// The search was abandoned because its requester gave up on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("planning cancelled")]
pub struct Cancelled;

/// Produces, simulates and scores every candidate maneuver of the playing
/// ship, keeping the best one.
#[derive(Debug, Clone, Default)]
pub struct TacticalPlanner {
    config: PlannerConfig,
}

impl TacticalPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Best maneuver for `ship`, `None` when it is not playing.
    ///
    /// Candidates are simulated with a copy of `rng`, the generator the live
    /// battle will draw from. Arena scans and tie-breaks use a generator
    /// forked from it, so the live sequence is never consumed here.
    pub fn plan(&self, battle: &Battle, ship: ShipId, rng: &PcgRng) -> Option<ScoredManeuver> {
        self.plan_until(battle, ship, rng, &AtomicBool::new(false))
            .unwrap_or(None)
    }

    /// Same as [`plan`](Self::plan), giving up as soon as `cancel` is set.
    ///
    /// The flag is checked before each candidate simulation.
    pub fn plan_until(
        &self,
        battle: &Battle,
        ship: ShipId,
        rng: &PcgRng,
        cancel: &AtomicBool,
    ) -> Result<Option<ScoredManeuver>, Cancelled> {
        if !battle.is_playing(ship) {
            return Ok(None);
        }
        let Some(playing) = battle.ship(ship) else {
            return Ok(None);
        };
        let mut search = rng.fork(SEARCH_STREAM ^ u64::from(battle.cycle));
        let candidates = ManeuverGenerator::generate(battle, playing, &self.config, &mut search);
        let produced = candidates.len();
        let weights = self.config.weights_for(playing.fleet);

        let mut best: Option<ScoredManeuver> = None;
        let mut evaluated = 0usize;
        for maneuver in candidates {
            if cancel.load(Ordering::Relaxed) {
                debug!(
                    target: "runtime::planner",
                    ship = %ship,
                    evaluated,
                    produced,
                    "planning cancelled"
                );
                return Err(Cancelled);
            }
            let simulation = match Simulation::run(battle, &maneuver, rng) {
                Ok(simulation) => simulation,
                Err(err) => {
                    debug!(
                        target: "runtime::planner",
                        %maneuver,
                        reason = %err,
                        "candidate rejected"
                    );
                    continue;
                }
            };
            evaluated += 1;
            let candidate = SimulatedManeuver {
                maneuver,
                simulation,
            };
            let value = score(battle, playing, &candidate, &weights);
            debug!(target: "runtime::planner", %maneuver, score = value, "candidate scored");

            let replace = match best {
                None => true,
                Some(current) => {
                    ((value - current.score).abs() < self.config.tie_epsilon && search.bool())
                        || value > current.score
                }
            };
            if replace {
                best = Some(ScoredManeuver {
                    maneuver,
                    score: value,
                });
            }
        }

        let chosen = best.unwrap_or(ScoredManeuver {
            maneuver: Maneuver::end_turn(ship),
            score: f64::NEG_INFINITY,
        });
        info!(
            target: "runtime::planner",
            ship = %ship,
            maneuver = %chosen.maneuver,
            score = chosen.score,
            produced,
            evaluated,
            "maneuver chosen"
        );
        Ok(Some(chosen))
    }
}
