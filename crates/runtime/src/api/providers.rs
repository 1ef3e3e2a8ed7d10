//! Asynchronous abstraction for sourcing the actions of human fleets.
//!
//! AI fleets are driven by the planner worker. Fleets played by a human
//! (UI, network peer, script) get their actions from an [`ActionProvider`].
use async_trait::async_trait;

use battle_core::{Action, Battle, ShipId};

use super::errors::Result;
use crate::planner::TacticalPlanner;

/// Source of actions for the ships of one fleet.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Next action of `ship`, which is playing in `battle`.
    async fn provide_action(&self, ship: ShipId, battle: &Battle) -> Result<Action>;
}

/// Always ends the turn. Useful for tests or as a passive opponent.
pub struct EndTurnProvider;

#[async_trait]
impl ActionProvider for EndTurnProvider {
    async fn provide_action(&self, ship: ShipId, _battle: &Battle) -> Result<Action> {
        Ok(Action::end_turn(ship))
    }
}

/// Plans inline with the tactical planner, using a fixed generator.
///
/// The battle worker's generator is not exposed to providers, so damage
/// rolls in the simulated maneuvers may differ from the live ones.
pub struct PlannerProvider {
    planner: TacticalPlanner,
    seed: u64,
}

impl PlannerProvider {
    pub fn new(planner: TacticalPlanner, seed: u64) -> Self {
        Self { planner, seed }
    }
}

#[async_trait]
impl ActionProvider for PlannerProvider {
    async fn provide_action(&self, ship: ShipId, battle: &Battle) -> Result<Action> {
        let rng = battle_core::PcgRng::from_seed(self.seed).fork(u64::from(battle.cycle));
        Ok(self
            .planner
            .plan(battle, ship, &rng)
            .map_or(Action::end_turn(ship), |chosen| chosen.maneuver.action()))
    }
}
